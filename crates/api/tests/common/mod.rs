//! Shared harness for API integration tests.
//!
//! Mirrors the router construction in `main.rs` (same middleware stack,
//! same static mounts) but wires in an in-memory database, a vision
//! client that is always down (exercising the deterministic fallback)
//! and the local pixel backend, so tests run fully offline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

use roomstage_api::config::{BackendKind, ProviderConfig, ServerConfig};
use roomstage_api::engine::PlacementEngine;
use roomstage_api::recommend::Recommender;
use roomstage_api::router::build_app_router;
use roomstage_api::state::AppState;
use roomstage_compose::PixelCompositeBackend;
use roomstage_core::retry::RetryPolicy;
use roomstage_db::DbPool;
use roomstage_vision::prompts::VisionPrompt;
use roomstage_vision::{PlacementAnalyzer, VisionClient, VisionError};

/// Vision client that always fails, so every analysis degrades to the
/// deterministic fallback layout.
pub struct DownVision;

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

pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    /// Keeps the data directory alive for the test's duration.
    pub data_dir: TempDir,
}

/// Trial quota used by the test configuration.
pub const TEST_TRIAL_LIMIT: i64 = 3;

pub fn test_config(data_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        data_dir: data_dir.to_path_buf(),
        database_url: "sqlite::memory:".to_string(),
        trial_limit: TEST_TRIAL_LIMIT,
        backend: BackendKind::Pixel,
        providers: ProviderConfig {
            vision_api_url: String::new(),
            vision_api_key: String::new(),
            vision_model: "gpt-4o".to_string(),
            generation_create_url: String::new(),
            generation_query_url: String::new(),
            generation_api_key: String::new(),
            generation_model: "nano-banana-pro".to_string(),
            hosting_api_url: String::new(),
            hosting_api_key: None,
        },
    }
}

/// Build the full application with offline collaborators.
pub async fn test_app() -> TestApp {
    let data_dir = tempfile::tempdir().expect("temp data dir");
    let config = test_config(data_dir.path());
    for dir in [
        config.uploads_dir(),
        config.results_dir(),
        config.catalog_dir(),
    ] {
        std::fs::create_dir_all(dir).unwrap();
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    roomstage_db::init_schema(&pool).await.expect("schema");

    let analyzer = PlacementAnalyzer::new(Arc::new(DownVision)).with_retry(RetryPolicy {
        max_attempts: 1,
        delay: std::time::Duration::ZERO,
    });
    let engine = Arc::new(PlacementEngine::new(
        analyzer,
        Arc::new(PixelCompositeBackend),
        None,
        config.results_dir(),
        config.trial_limit,
    ));

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        engine,
        recommender: Arc::new(Recommender::new(None)),
    };

    TestApp {
        router: build_app_router(state, &config),
        pool,
        data_dir,
    }
}

/// Write a solid PNG for use as a room or furniture image.
pub fn save_png(path: &Path, w: u32, h: u32) {
    image::RgbaImage::from_pixel(w, h, image::Rgba([90, 90, 90, 255]))
        .save(path)
        .unwrap();
}

/// Percent-encode a form value.
fn urlencode(s: &str) -> String {
    let mut out = String::new();
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Encode key/value pairs as an `application/x-www-form-urlencoded` body.
pub fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencode(k), urlencode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// POST a form to the generate endpoint, optionally spoofing the
/// client identity via `x-forwarded-for`.
pub fn generate_request(pairs: &[(&str, &str)], forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/generate")
        .header("content-type", "application/x-www-form-urlencoded");
    if let Some(ip) = forwarded_for {
        builder = builder.header("x-forwarded-for", ip);
    }
    builder.body(Body::from(form_body(pairs))).unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!("response is not JSON ({e}): {}", String::from_utf8_lossy(&bytes))
    })
}
