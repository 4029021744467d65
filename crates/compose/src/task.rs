//! Submit/poll client for the external generation provider.
//!
//! The provider queues a task per generation call; completion is
//! observed by polling a status endpoint on a fixed interval with a
//! bounded attempt count. Unknown or absent states count as
//! in-progress. The API surface is a trait so the poll loop and the
//! generative backend can be driven by scripted fakes in tests.

use std::time::Duration;

use serde_json::json;

use crate::backend::ComposeError;

/// Fixed polling cadence against the status endpoint.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Wait between status queries.
    pub interval: Duration,
    /// Total status queries before the wait times out.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    // 240 polls at 2 seconds bounds the wait at about 8 minutes.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 240,
        }
    }
}

/// Input for one generation task.
#[derive(Debug, Clone)]
pub struct GenerationTask {
    pub model: String,
    pub prompt: String,
    /// Room first, then the furniture reference (image or collage).
    pub image_urls: Vec<String>,
    pub aspect_ratio: String,
    pub resolution: String,
}

/// One observation of a task's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPoll {
    /// Queued, running, or anything the provider invents later.
    InProgress,
    /// Finished; the result image is at `result_url`.
    Succeeded { result_url: String },
    /// Finished unsuccessfully, with the provider's reason.
    Failed { code: String, message: String },
}

/// The provider's task API.
#[async_trait::async_trait]
pub trait GenerationApi: Send + Sync {
    /// Queue a generation task, returning its id.
    async fn submit(&self, task: &GenerationTask) -> Result<String, ComposeError>;

    /// Query a task's current state.
    async fn poll(&self, task_id: &str) -> Result<TaskPoll, ComposeError>;
}

/// Poll until the task reaches a terminal state.
///
/// Transport errors during polling are treated like in-progress states
/// and only surface if they persist through the final attempt; task
/// failure surfaces immediately with the provider's reason.
pub async fn wait_for_result(
    api: &dyn GenerationApi,
    task_id: &str,
    config: &PollConfig,
) -> Result<String, ComposeError> {
    let attempts = config.max_attempts.max(1);
    for attempt in 1..=attempts {
        match api.poll(task_id).await {
            Ok(TaskPoll::Succeeded { result_url }) => {
                tracing::info!(task_id, attempt, "Generation task succeeded");
                return Ok(result_url);
            }
            Ok(TaskPoll::Failed { code, message }) => {
                return Err(ComposeError::TaskFailed(format!("[{code}] {message}")));
            }
            Ok(TaskPoll::InProgress) => {
                if attempt % 5 == 0 {
                    tracing::debug!(task_id, attempt, max_attempts = attempts, "Still waiting");
                }
            }
            Err(e) if attempt == attempts => return Err(e),
            Err(e) => {
                tracing::warn!(task_id, attempt, error = %e, "Status query failed, will retry");
            }
        }
        if attempt < attempts {
            tokio::time::sleep(config.interval).await;
        }
    }
    Err(ComposeError::Timeout { attempts })
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// REST client for a Kie-style job API (`createTask` / `recordInfo`).
pub struct KieGenerationApi {
    client: reqwest::Client,
    create_url: String,
    query_url: String,
    api_key: String,
}

impl KieGenerationApi {
    pub fn new(create_url: String, query_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            create_url,
            query_url,
            api_key,
        }
    }

    /// Ensure a success HTTP status, classifying 5xx as retryable
    /// unavailability. Returns the parsed JSON body.
    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, ComposeError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return if status.is_server_error() {
                Err(ComposeError::Unavailable {
                    status: status.as_u16(),
                    body,
                })
            } else {
                Err(ComposeError::Api {
                    status: status.as_u16(),
                    body,
                })
            };
        }
        Ok(response.json().await?)
    }

    /// The provider wraps everything in `{code, message, data}`; a code
    /// other than 200 is an API-level failure even on HTTP 200.
    fn unwrap_envelope(payload: serde_json::Value) -> Result<serde_json::Value, ComposeError> {
        if payload["code"].as_i64() != Some(200) {
            return Err(ComposeError::Api {
                status: 200,
                body: payload["message"].as_str().unwrap_or("unknown error").to_string(),
            });
        }
        Ok(payload["data"].clone())
    }
}

#[async_trait::async_trait]
impl GenerationApi for KieGenerationApi {
    async fn submit(&self, task: &GenerationTask) -> Result<String, ComposeError> {
        let body = json!({
            "model": task.model,
            "input": {
                "prompt": task.prompt,
                "image_input": task.image_urls,
                "aspect_ratio": task.aspect_ratio,
                "resolution": task.resolution,
                "output_format": "png",
            }
        });

        let response = self
            .client
            .post(&self.create_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let data = Self::unwrap_envelope(Self::read_json(response).await?)?;
        let task_id = data["taskId"].as_str().ok_or_else(|| ComposeError::Api {
            status: 200,
            body: "response carried no taskId".to_string(),
        })?;

        tracing::info!(task_id, model = %task.model, "Generation task queued");
        Ok(task_id.to_string())
    }

    async fn poll(&self, task_id: &str) -> Result<TaskPoll, ComposeError> {
        let response = self
            .client
            .get(&self.query_url)
            .bearer_auth(&self.api_key)
            .query(&[("taskId", task_id)])
            .send()
            .await?;

        let data = Self::unwrap_envelope(Self::read_json(response).await?)?;
        match data["state"].as_str() {
            Some("success") => {
                // The result arrives as a JSON string inside resultJson.
                let raw = data["resultJson"].as_str().ok_or_else(|| {
                    ComposeError::TaskFailed("success state without resultJson".to_string())
                })?;
                let result: serde_json::Value = serde_json::from_str(raw)
                    .map_err(|e| ComposeError::TaskFailed(format!("bad resultJson: {e}")))?;
                let url = result["resultUrls"][0].as_str().ok_or_else(|| {
                    ComposeError::TaskFailed("resultJson carried no resultUrls".to_string())
                })?;
                Ok(TaskPoll::Succeeded {
                    result_url: url.to_string(),
                })
            }
            Some("fail") => Ok(TaskPoll::Failed {
                code: data["failCode"].as_str().unwrap_or("").to_string(),
                message: data["failMsg"].as_str().unwrap_or("Unknown error").to_string(),
            }),
            // queued, running, absent, or anything unrecognized.
            _ => Ok(TaskPoll::InProgress),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
