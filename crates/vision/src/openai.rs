//! OpenAI-compatible chat-completions client with image input.
//!
//! Images are embedded as base64 data URLs, so the vision provider
//! needs no access to the service's filesystem or hosting.

use std::path::{Path, PathBuf};

use base64::Engine;
use serde_json::json;

use crate::client::{VisionClient, VisionError};
use crate::prompts::VisionPrompt;

/// Response token budget for placement analyses.
const MAX_TOKENS: u32 = 1500;
/// Low temperature keeps the JSON contract stable.
const TEMPERATURE: f64 = 0.3;

/// HTTP client for an OpenAI-compatible vision endpoint.
pub struct OpenAiVisionClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiVisionClient {
    /// Create a client for `api_url` (base URL without the
    /// `/chat/completions` suffix), e.g. `https://api.openai.com/v1`.
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    /// Read a local image and wrap it as a data URL message part.
    fn image_part(path: &Path) -> Result<serde_json::Value, VisionError> {
        let bytes = std::fs::read(path).map_err(|source| VisionError::Image {
            path: path.display().to_string(),
            source,
        })?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(json!({
            "type": "image_url",
            "image_url": {
                "url": format!("data:image/png;base64,{encoded}"),
                "detail": "high"
            }
        }))
    }
}

#[async_trait::async_trait]
impl VisionClient for OpenAiVisionClient {
    async fn analyze(
        &self,
        prompt: &VisionPrompt,
        images: &[PathBuf],
    ) -> Result<String, VisionError> {
        let mut content = vec![json!({ "type": "text", "text": prompt.user })];
        for path in images {
            content.push(Self::image_part(path)?);
        }

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": content },
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            // 503 and the provider's overload code are maintenance
            // conditions worth retrying; everything else is a rejection.
            return if status.as_u16() == 503 || status.as_u16() == 529 {
                Err(VisionError::Unavailable {
                    status: status.as_u16(),
                    body,
                })
            } else {
                Err(VisionError::Rejected {
                    status: status.as_u16(),
                    body,
                })
            };
        }

        let payload: serde_json::Value = response.json().await?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .filter(|s| !s.trim().is_empty())
            .ok_or(VisionError::Empty)?;

        tracing::debug!(
            model = %self.model,
            images = images.len(),
            response_chars = content.len(),
            "Vision analysis response received",
        );

        Ok(content)
    }
}
