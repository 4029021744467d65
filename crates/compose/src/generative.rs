//! Generative composition backend.
//!
//! Drives the submit/poll provider for the three generative flows:
//! single reference image, multi-item collage (one call regardless of
//! item count), and replace. Input images travel as hosted URLs or
//! inline data URIs; the result is downloaded into the request's output
//! directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use roomstage_core::aspect::snap_aspect_ratio;
use roomstage_core::geometry::ROTATION_QUARTER;
use roomstage_core::layout::{COLLAGE_MAX_ITEM_HEIGHT, COLLAGE_PADDING};
use roomstage_core::retry::RetryPolicy;

use crate::backend::{ComposeBackend, ComposeError, ComposeRequest, CompositionMode};
use crate::collage::render_collage;
use crate::hosting::ImageHost;
use crate::prompts;
use crate::task::{wait_for_result, GenerationApi, GenerationTask, PollConfig};

/// Output resolution requested from the provider. 1K keeps generation
/// fast; the result is bounded again locally before it is returned.
const RESOLUTION: &str = "1K";

/// Composition through the external generation provider.
pub struct GenerativeBackend {
    api: Arc<dyn GenerationApi>,
    host: ImageHost,
    model: String,
    poll: PollConfig,
    submit_retry: RetryPolicy,
    client: reqwest::Client,
}

impl GenerativeBackend {
    pub fn new(api: Arc<dyn GenerationApi>, host: ImageHost, model: String) -> Self {
        Self {
            api,
            host,
            model,
            poll: PollConfig::default(),
            submit_retry: RetryPolicy::default(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the polling cadence (tests use a zero interval).
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Submit with bounded retries on maintenance conditions, wait for
    /// the task, and download the result.
    async fn generate(
        &self,
        prompt: String,
        image_urls: Vec<String>,
        room_path: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, ComposeError> {
        let (room_w, room_h) = image::image_dimensions(room_path)?;
        let task = GenerationTask {
            model: self.model.clone(),
            prompt,
            image_urls,
            aspect_ratio: snap_aspect_ratio(room_w, room_h).to_string(),
            resolution: RESOLUTION.to_string(),
        };

        let task_id = self
            .submit_retry
            .run(|| self.api.submit(&task), ComposeError::is_retryable)
            .await?;

        let result_url = wait_for_result(self.api.as_ref(), &task_id, &self.poll).await?;
        self.download(&result_url, output_dir).await
    }

    /// Fetch the provider's result image and store it locally as PNG.
    async fn download(&self, url: &str, output_dir: &Path) -> Result<PathBuf, ComposeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ComposeError::Api {
                status: status.as_u16(),
                body: format!("result download failed for {url}"),
            });
        }
        let bytes = response.bytes().await?;
        let img = image::load_from_memory(&bytes)?;

        let output = output_dir.join(format!("result_{}.png", uuid::Uuid::new_v4()));
        img.save(&output)?;
        Ok(output)
    }

    /// Reference URL for the furniture image, pre-rotating it on disk
    /// when the placement asks for a quarter turn. Returns the URL and
    /// the temp file to delete afterwards, if one was created.
    async fn furniture_url(
        &self,
        furniture_path: &Path,
        rotation: i32,
        output_dir: &Path,
    ) -> Result<(String, Option<PathBuf>), ComposeError> {
        if rotation != ROTATION_QUARTER {
            return Ok((self.host.public_url(furniture_path).await?, None));
        }

        tracing::debug!(path = %furniture_path.display(), "Rotating furniture 90 degrees");
        let rotated = image::imageops::rotate90(&image::open(furniture_path)?.to_rgba8());
        let tmp = output_dir.join(format!("rotated_{}.png", uuid::Uuid::new_v4()));
        rotated.save(&tmp)?;

        match self.host.public_url(&tmp).await {
            Ok(url) => Ok((url, Some(tmp))),
            Err(e) => {
                let _ = std::fs::remove_file(&tmp);
                Err(e)
            }
        }
    }

    async fn place_single(&self, request: &ComposeRequest) -> Result<PathBuf, ComposeError> {
        let room_url = self.host.public_url(&request.room_path).await?;
        let (furniture_url, rotated_tmp) = self
            .furniture_url(
                &request.furniture_paths[0],
                request.analysis.placement.rotation,
                &request.output_dir,
            )
            .await?;

        let prompt = prompts::single_placement(&request.analysis);
        let result = self
            .generate(
                prompt,
                vec![room_url, furniture_url],
                &request.room_path,
                &request.output_dir,
            )
            .await;

        if let Some(tmp) = rotated_tmp {
            let _ = std::fs::remove_file(tmp);
        }
        result
    }

    async fn place_collage(&self, request: &ComposeRequest) -> Result<PathBuf, ComposeError> {
        let collage_path = request
            .output_dir
            .join(format!("collage_{}.png", uuid::Uuid::new_v4()));
        render_collage(
            &request.furniture_paths,
            &collage_path,
            COLLAGE_MAX_ITEM_HEIGHT,
            COLLAGE_PADDING,
        )?;

        let result = async {
            let room_url = self.host.public_url(&request.room_path).await?;
            let collage_url = self.host.public_url(&collage_path).await?;
            let prompt =
                prompts::multi_placement(&request.analysis, request.furniture_paths.len());
            self.generate(
                prompt,
                vec![room_url, collage_url],
                &request.room_path,
                &request.output_dir,
            )
            .await
        }
        .await;

        let _ = std::fs::remove_file(&collage_path);
        result
    }

    async fn replace(
        &self,
        request: &ComposeRequest,
        hint: Option<&str>,
    ) -> Result<PathBuf, ComposeError> {
        let room_url = self.host.public_url(&request.room_path).await?;
        let furniture_url = self.host.public_url(&request.furniture_paths[0]).await?;
        let prompt = prompts::replace(hint);
        self.generate(
            prompt,
            vec![room_url, furniture_url],
            &request.room_path,
            &request.output_dir,
        )
        .await
    }
}

#[async_trait::async_trait]
impl ComposeBackend for GenerativeBackend {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn preserves_original(&self) -> bool {
        // Generative output may drift from the source pixels.
        false
    }

    async fn compose(&self, request: &ComposeRequest) -> Result<PathBuf, ComposeError> {
        match &request.mode {
            CompositionMode::Place => match request.furniture_paths.len() {
                0 => Err(ComposeError::Unsupported(
                    "place mode needs at least one furniture image".to_string(),
                )),
                1 => self.place_single(request).await,
                // 2 to 5 items: one collage, one generation call.
                _ => self.place_collage(request).await,
            },
            CompositionMode::Replace { hint } => {
                if request.furniture_paths.len() != 1 {
                    return Err(ComposeError::Unsupported(
                        "replace mode takes exactly one furniture image".to_string(),
                    ));
                }
                self.replace(request, hint.as_deref()).await
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
