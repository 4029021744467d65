//! Placement-mode dispatch.
//!
//! Drives one generation request end to end: fail-fast validation,
//! quota check, vision analysis with deterministic degradation, manual
//! geometry overrides, backend selection and invocation, result
//! downscaling and usage accounting.
//!
//! Ordering inside a request is fixed: the manual box is applied
//! strictly after analysis (manual geometry overrides AI geometry,
//! never the reverse), and rotation/wall-alignment finalization runs
//! strictly after that, so the validated request values always win.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use roomstage_compose::resize::{downscale_longest_side, MAX_RESULT_EDGE};
use roomstage_compose::{ComposeBackend, ComposeRequest, CompositionMode};
use roomstage_core::analysis::{fallback_analysis, PlacementAnalysis};
use roomstage_core::geometry::{
    infer_wall_alignment, resolve_manual_position, validate_rotation, ManualBox, WallAlignment,
};
use roomstage_core::quota::check_quota;
use roomstage_core::CoreError;
use roomstage_db::repositories::TrialUsageRepo;
use roomstage_db::DbPool;
use roomstage_vision::PlacementAnalyzer;

use crate::error::{AppError, AppResult};

/// Hard cap on furniture images per request.
pub const MAX_FURNITURE_ITEMS: usize = 5;

/// Form fields of the generate endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateParams {
    pub room_image_path: String,
    /// JSON-encoded array of 1 to 5 furniture image paths.
    pub furniture_image_paths: String,
    /// `auto` lets the analysis pick the spot; `manual` uses the box or
    /// legacy point below.
    #[serde(default = "default_mode")]
    pub mode: String,
    /// `place` inserts into empty space; `replace` swaps an existing item.
    #[serde(default = "default_placement_mode")]
    pub placement_mode: String,
    // Manual rectangle in original room-image pixels.
    pub manual_box_x: Option<i64>,
    pub manual_box_y: Option<i64>,
    pub manual_box_w: Option<i64>,
    pub manual_box_h: Option<i64>,
    // Legacy single-click position.
    pub manual_x: Option<i64>,
    pub manual_y: Option<i64>,
    #[serde(default)]
    pub furniture_rotation: i32,
    #[serde(default = "default_wall_alignment")]
    pub wall_alignment: String,
    /// Free-text hint of what to swap out in replace mode.
    pub replace_hint: Option<String>,
}

fn default_mode() -> String {
    "auto".to_string()
}

fn default_placement_mode() -> String {
    "place".to_string()
}

fn default_wall_alignment() -> String {
    "auto".to_string()
}

/// Successful generation payload, identical across backends.
#[derive(Debug, Serialize)]
pub struct GenerationResult {
    pub result_image_path: String,
    pub result_image_url: String,
    pub generation_time_seconds: f64,
    pub model_used: String,
    /// Static capability flag of the chosen backend, not a measurement.
    pub preserves_original: bool,
    /// The resolved analysis the composition actually used.
    pub analysis: PlacementAnalysis,
    pub furniture_count: usize,
}

/// The per-request generation pipeline.
pub struct PlacementEngine {
    analyzer: PlacementAnalyzer,
    /// Backend for single-item place requests (pixel or generative,
    /// per configuration).
    single_backend: Arc<dyn ComposeBackend>,
    /// Generative backend; required for multi-item and replace
    /// requests, which cannot be expressed as pixel composites.
    generative_backend: Option<Arc<dyn ComposeBackend>>,
    results_dir: PathBuf,
    trial_limit: i64,
}

impl PlacementEngine {
    pub fn new(
        analyzer: PlacementAnalyzer,
        single_backend: Arc<dyn ComposeBackend>,
        generative_backend: Option<Arc<dyn ComposeBackend>>,
        results_dir: PathBuf,
        trial_limit: i64,
    ) -> Self {
        Self {
            analyzer,
            single_backend,
            generative_backend,
            results_dir,
            trial_limit,
        }
    }

    /// Run one generation request for `client_id`.
    pub async fn generate(
        &self,
        pool: &DbPool,
        params: &GenerateParams,
        client_id: &str,
    ) -> AppResult<GenerationResult> {
        let start = Instant::now();

        // --- Fail-fast validation ---
        let furniture_paths = parse_furniture_paths(&params.furniture_image_paths)?;
        let rotation = validate_rotation(params.furniture_rotation)?;
        let requested_wall: WallAlignment = params.wall_alignment.parse()?;
        let replace = match params.placement_mode.as_str() {
            "place" => false,
            "replace" => true,
            other => {
                return Err(CoreError::Validation(format!(
                    "placement_mode must be 'place' or 'replace' (got '{other}')"
                ))
                .into())
            }
        };
        if replace && furniture_paths.len() != 1 {
            return Err(CoreError::Validation(format!(
                "replace mode takes exactly 1 furniture image (got {})",
                furniture_paths.len()
            ))
            .into());
        }

        // --- Quota ---
        let used = TrialUsageRepo::count(pool, client_id).await?;
        check_quota(used, self.trial_limit)?;

        let room_path = PathBuf::from(&params.room_image_path);
        let (room_w, room_h) = image::image_dimensions(&room_path).map_err(|e| {
            AppError::BadRequest(format!(
                "room image '{}' is not readable: {e}",
                params.room_image_path
            ))
        })?;

        let n = furniture_paths.len();
        tracing::info!(
            client_id,
            furniture_count = n,
            mode = %params.mode,
            placement_mode = %params.placement_mode,
            room = ?(room_w, room_h),
            "Starting generation",
        );

        // --- Manual geometry inputs (manual mode only) ---
        let manual_box = (params.mode == "manual")
            .then(|| manual_box_from(params))
            .flatten();
        let manual_position =
            resolve_manual_position(&params.mode, manual_box, manual_point_from(params));

        // --- Analysis, then overrides, in that order ---
        let (mut analysis, mode) = if replace {
            // No placement geometry in replace mode: the target location
            // is wherever the described old item currently sits.
            let hint = match params.replace_hint.clone().filter(|h| !h.trim().is_empty()) {
                Some(hint) => Some(hint),
                None => self.derive_replace_hint(&room_path).await,
            };
            (
                PlacementAnalysis::default(),
                CompositionMode::Replace { hint },
            )
        } else {
            (
                self.analyze_place(&room_path, &furniture_paths, manual_position)
                    .await,
                CompositionMode::Place,
            )
        };

        let mut wall = requested_wall;
        if !replace {
            if let Some(bbox) = manual_box {
                analysis.apply_manual_box(bbox, room_w, room_h);
                if wall == WallAlignment::Auto {
                    wall = infer_wall_alignment(bbox.clamped(room_w, room_h), room_w);
                    tracing::debug!(wall = %wall, "Inferred wall alignment from manual box");
                }
            }
        }
        analysis.finalize_orientation(rotation, wall);

        // --- Dispatch ---
        let backend = self.select_backend(replace, n)?;
        let request = ComposeRequest {
            room_path,
            furniture_paths,
            mode,
            analysis,
            output_dir: self.results_dir.clone(),
        };
        let result_path = backend.compose(&request).await?;

        // --- Post-processing and accounting ---
        downscale_longest_side(&result_path, MAX_RESULT_EDGE)?;

        if let Err(e) = TrialUsageRepo::increment(pool, client_id).await {
            tracing::error!(client_id, error = %e, "Failed to record trial usage");
        }

        let filename = result_path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        let elapsed = start.elapsed().as_secs_f64();
        tracing::info!(
            client_id,
            model = backend.model_name(),
            elapsed_secs = elapsed,
            "Generation finished",
        );

        Ok(GenerationResult {
            result_image_path: result_path.display().to_string(),
            result_image_url: format!("/results/{filename}"),
            generation_time_seconds: elapsed,
            model_used: backend.model_name().to_string(),
            preserves_original: backend.preserves_original(),
            analysis: request.analysis,
            furniture_count: n,
        })
    }

    /// Analysis for place mode with the deterministic degradation
    /// contract: any vision failure yields the fallback layout and the
    /// request proceeds.
    async fn analyze_place(
        &self,
        room_path: &std::path::Path,
        furniture_paths: &[PathBuf],
        manual_position: Option<(i64, i64)>,
    ) -> PlacementAnalysis {
        let result = if furniture_paths.len() == 1 {
            self.analyzer
                .analyze_placement(room_path, &furniture_paths[0], manual_position)
                .await
        } else {
            self.analyzer
                .analyze_multi_placement(room_path, furniture_paths)
                .await
        };
        match result {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    furniture_count = furniture_paths.len(),
                    "Vision analysis unavailable, substituting deterministic fallback layout",
                );
                fallback_analysis(furniture_paths.len())
            }
        }
    }

    /// Describe what to swap out, from the replace-mode room scan.
    /// `None` when nothing is confidently visible.
    async fn derive_replace_hint(&self, room_path: &std::path::Path) -> Option<String> {
        let items = self.analyzer.analyze_room_for_replace(room_path).await;
        if items.is_empty() {
            return None;
        }
        let described: Vec<String> = items
            .iter()
            .map(|item| {
                if item.position.trim().is_empty() {
                    item.item_type.clone()
                } else {
                    format!("{} ({})", item.item_type, item.position)
                }
            })
            .collect();
        Some(described.join("; "))
    }

    /// Pick the backend for this request shape.
    ///
    /// Replace and multi-item requests always go generative (0 or 2..=5
    /// items never take a degraded single-item path); exactly one item
    /// in place mode uses the configured default.
    fn select_backend(&self, replace: bool, item_count: usize) -> AppResult<&dyn ComposeBackend> {
        if replace || item_count >= 2 {
            self.generative_backend
                .as_deref()
                .ok_or_else(|| {
                    AppError::InternalError(
                        "this request needs the generative backend; configure GENERATION_API_KEY"
                            .to_string(),
                    )
                })
        } else {
            Ok(self.single_backend.as_ref())
        }
    }
}

/// Decode and bound the furniture path list.
fn parse_furniture_paths(raw: &str) -> Result<Vec<PathBuf>, CoreError> {
    let paths: Vec<String> = serde_json::from_str(raw).map_err(|_| {
        CoreError::Validation("furniture_image_paths must be a JSON array of paths".to_string())
    })?;
    if paths.is_empty() {
        return Err(CoreError::Validation(
            "at least one furniture image is required".to_string(),
        ));
    }
    if paths.len() > MAX_FURNITURE_ITEMS {
        return Err(CoreError::Validation(format!(
            "at most {MAX_FURNITURE_ITEMS} furniture images are supported (got {})",
            paths.len()
        )));
    }
    Ok(paths.into_iter().map(PathBuf::from).collect())
}

/// The manual rectangle, present only when all four fields are set.
fn manual_box_from(params: &GenerateParams) -> Option<ManualBox> {
    match (
        params.manual_box_x,
        params.manual_box_y,
        params.manual_box_w,
        params.manual_box_h,
    ) {
        (Some(x), Some(y), Some(w), Some(h)) => Some(ManualBox { x, y, w, h }),
        _ => None,
    }
}

fn manual_point_from(params: &GenerateParams) -> Option<(i64, i64)> {
    match (params.manual_x, params.manual_y) {
        (Some(x), Some(y)) => Some((x, y)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::path::Path;

    use roomstage_compose::{ComposeError, PixelCompositeBackend};
    use roomstage_core::retry::RetryPolicy;
    use roomstage_vision::prompts::VisionPrompt;
    use roomstage_vision::{VisionClient, VisionError};

    /// Vision client that always fails, driving the fallback layout.
    struct DownVision;

    #[async_trait::async_trait]
    impl VisionClient for DownVision {
        async fn analyze(
            &self,
            _prompt: &VisionPrompt,
            _images: &[PathBuf],
        ) -> Result<String, VisionError> {
            Err(VisionError::Empty)
        }
    }

    /// Generative stand-in: copies the room image as the "result".
    struct FakeGenerative;

    #[async_trait::async_trait]
    impl ComposeBackend for FakeGenerative {
        fn model_name(&self) -> &str {
            "fake-generative"
        }

        fn preserves_original(&self) -> bool {
            false
        }

        async fn compose(&self, request: &ComposeRequest) -> Result<PathBuf, ComposeError> {
            let output = request
                .output_dir
                .join(format!("result_{}.png", uuid::Uuid::new_v4()));
            std::fs::copy(&request.room_path, &output)?;
            Ok(output)
        }
    }

    async fn test_pool() -> DbPool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        roomstage_db::init_schema(&pool).await.unwrap();
        pool
    }

    fn engine(results_dir: &Path, with_generative: bool, trial_limit: i64) -> PlacementEngine {
        let analyzer = PlacementAnalyzer::new(Arc::new(DownVision)).with_retry(RetryPolicy {
            max_attempts: 1,
            delay: std::time::Duration::ZERO,
        });
        PlacementEngine::new(
            analyzer,
            Arc::new(PixelCompositeBackend),
            with_generative.then(|| Arc::new(FakeGenerative) as Arc<dyn ComposeBackend>),
            results_dir.to_path_buf(),
            trial_limit,
        )
    }

    fn save_png(path: &Path, w: u32, h: u32) {
        image::RgbaImage::from_pixel(w, h, image::Rgba([80, 80, 80, 255]))
            .save(path)
            .unwrap();
    }

    fn params(room: &Path, furniture: &[&Path]) -> GenerateParams {
        let paths: Vec<String> = furniture
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        GenerateParams {
            room_image_path: room.display().to_string(),
            furniture_image_paths: serde_json::to_string(&paths).unwrap(),
            mode: "auto".to_string(),
            placement_mode: "place".to_string(),
            manual_box_x: None,
            manual_box_y: None,
            manual_box_w: None,
            manual_box_h: None,
            manual_x: None,
            manual_y: None,
            furniture_rotation: 0,
            wall_alignment: "auto".to_string(),
            replace_hint: None,
        }
    }

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::Core(CoreError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    // -- fail-fast validation --

    #[tokio::test]
    async fn malformed_path_array_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let room = dir.path().join("room.png");
        save_png(&room, 100, 100);

        let mut p = params(&room, &[]);
        p.furniture_image_paths = "not json".to_string();
        let err = engine(dir.path(), false, 5).generate(&pool, &p, "c").await.unwrap_err();
        assert!(validation_message(err).contains("JSON array"));
    }

    #[tokio::test]
    async fn empty_and_oversized_path_arrays_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let room = dir.path().join("room.png");
        save_png(&room, 100, 100);
        let sofa = dir.path().join("sofa.png");
        save_png(&sofa, 10, 10);

        let p = params(&room, &[]);
        assert!(engine(dir.path(), false, 5).generate(&pool, &p, "c").await.is_err());

        let six: Vec<&Path> = std::iter::repeat(sofa.as_path()).take(6).collect();
        let p = params(&room, &six);
        let err = engine(dir.path(), false, 5).generate(&pool, &p, "c").await.unwrap_err();
        assert!(validation_message(err).contains("at most 5"));
    }

    #[tokio::test]
    async fn bad_rotation_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let room = dir.path().join("room.png");
        let sofa = dir.path().join("sofa.png");
        save_png(&room, 100, 100);
        save_png(&sofa, 10, 10);

        let mut p = params(&room, &[&sofa]);
        p.furniture_rotation = 45;
        let err = engine(dir.path(), false, 5).generate(&pool, &p, "c").await.unwrap_err();
        assert!(validation_message(err).contains("furniture_rotation"));
    }

    #[tokio::test]
    async fn bad_wall_alignment_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let room = dir.path().join("room.png");
        let sofa = dir.path().join("sofa.png");
        save_png(&room, 100, 100);
        save_png(&sofa, 10, 10);

        let mut p = params(&room, &[&sofa]);
        p.wall_alignment = "ceiling".to_string();
        let err = engine(dir.path(), false, 5).generate(&pool, &p, "c").await.unwrap_err();
        assert!(validation_message(err).contains("wall_alignment"));
    }

    #[tokio::test]
    async fn replace_with_two_items_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let room = dir.path().join("room.png");
        let sofa = dir.path().join("sofa.png");
        save_png(&room, 100, 100);
        save_png(&sofa, 10, 10);

        let mut p = params(&room, &[&sofa, &sofa]);
        p.placement_mode = "replace".to_string();
        let err = engine(dir.path(), true, 5).generate(&pool, &p, "c").await.unwrap_err();
        assert!(validation_message(err).contains("exactly 1"));
    }

    // -- dispatch --

    #[tokio::test]
    async fn replace_with_one_item_succeeds_without_preserving_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let room = dir.path().join("room.png");
        let sofa = dir.path().join("sofa.png");
        save_png(&room, 100, 100);
        save_png(&sofa, 10, 10);

        let mut p = params(&room, &[&sofa]);
        p.placement_mode = "replace".to_string();
        let result = engine(dir.path(), true, 5).generate(&pool, &p, "c").await.unwrap();
        assert!(!result.preserves_original);
        assert_eq!(result.model_used, "fake-generative");
    }

    #[tokio::test]
    async fn replace_without_generative_backend_is_an_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let room = dir.path().join("room.png");
        let sofa = dir.path().join("sofa.png");
        save_png(&room, 100, 100);
        save_png(&sofa, 10, 10);

        let mut p = params(&room, &[&sofa]);
        p.placement_mode = "replace".to_string();
        let err = engine(dir.path(), false, 5).generate(&pool, &p, "c").await.unwrap_err();
        assert_matches!(err, AppError::InternalError(_));
    }

    #[tokio::test]
    async fn multi_item_place_requires_generative_backend() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let room = dir.path().join("room.png");
        let sofa = dir.path().join("sofa.png");
        save_png(&room, 100, 100);
        save_png(&sofa, 10, 10);

        let p = params(&room, &[&sofa, &sofa]);
        let err = engine(dir.path(), false, 5).generate(&pool, &p, "c").await.unwrap_err();
        assert_matches!(err, AppError::InternalError(_));
    }

    // -- end to end with the vision backend down --

    #[tokio::test]
    async fn place_succeeds_with_fallback_layout_when_vision_is_down() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let room = dir.path().join("room.png");
        let sofa = dir.path().join("sofa.png");
        save_png(&room, 1920, 1080);
        save_png(&sofa, 60, 40);

        let p = params(&room, &[&sofa]);
        let result = engine(dir.path(), false, 5).generate(&pool, &p, "c").await.unwrap();

        // Single-item fallback puts the item at x = 25, not centered.
        assert_eq!(result.analysis.placement.rect.x_percent, 25.0);
        assert_eq!(result.analysis.placement.rect.y_percent, 55.0);
        assert_eq!(result.furniture_count, 1);
        assert_eq!(result.model_used, "pixel-composite");
        assert!(result.preserves_original);
        assert!(result.result_image_url.starts_with("/results/"));

        // The 1920x1080 composite was bounded to 1200 on its long side.
        let saved = image::open(&result.result_image_path).unwrap();
        assert_eq!((saved.width(), saved.height()), (1200, 675));
    }

    #[tokio::test]
    async fn manual_box_overrides_layout_and_infers_wall() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let room = dir.path().join("room.png");
        let sofa = dir.path().join("sofa.png");
        save_png(&room, 1000, 800);
        save_png(&sofa, 60, 40);

        let mut p = params(&room, &[&sofa]);
        p.mode = "manual".to_string();
        p.manual_box_x = Some(10);
        p.manual_box_y = Some(300);
        p.manual_box_w = Some(200);
        p.manual_box_h = Some(200);
        p.furniture_rotation = 90;

        let result = engine(dir.path(), false, 5).generate(&pool, &p, "c").await.unwrap();
        let placement = &result.analysis.placement;
        // Center of the user box, not the fallback layout.
        assert_eq!(placement.rect.x_percent, 11.0);
        assert_eq!(placement.rect.width_percent, 20.0);
        // Left margin is smallest, so the wall was inferred as left.
        assert_eq!(placement.wall_alignment, WallAlignment::Left);
        // The validated request rotation always wins.
        assert_eq!(placement.rotation, 90);
    }

    #[tokio::test]
    async fn explicit_wall_alignment_is_not_overridden() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let room = dir.path().join("room.png");
        let sofa = dir.path().join("sofa.png");
        save_png(&room, 1000, 800);
        save_png(&sofa, 60, 40);

        let mut p = params(&room, &[&sofa]);
        p.mode = "manual".to_string();
        p.manual_box_x = Some(10);
        p.manual_box_y = Some(300);
        p.manual_box_w = Some(200);
        p.manual_box_h = Some(200);
        p.wall_alignment = "back".to_string();

        let result = engine(dir.path(), false, 5).generate(&pool, &p, "c").await.unwrap();
        assert_eq!(
            result.analysis.placement.wall_alignment,
            WallAlignment::Back
        );
    }

    // -- quota --

    #[tokio::test]
    async fn fourth_generation_is_rejected_at_limit_three() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let room = dir.path().join("room.png");
        let sofa = dir.path().join("sofa.png");
        save_png(&room, 200, 100);
        save_png(&sofa, 20, 20);

        let eng = engine(dir.path(), false, 3);
        let p = params(&room, &[&sofa]);

        for _ in 0..3 {
            eng.generate(&pool, &p, "client-a").await.unwrap();
        }
        let err = eng.generate(&pool, &p, "client-a").await.unwrap_err();
        assert_matches!(
            err,
            AppError::Core(CoreError::QuotaExceeded { used: 3, limit: 3 })
        );

        // A different client is unaffected.
        eng.generate(&pool, &p, "client-b").await.unwrap();
    }
}
