//! Public image references for the generation provider.
//!
//! The provider fetches its input images by URL. Preferred path is an
//! ImgBB-style hosting upload with a short expiration; when no key is
//! configured or the upload fails, the image is inlined as a base64
//! data URI instead of aborting the request.

use std::path::Path;

use base64::Engine;

use roomstage_core::retry::RetryPolicy;

use crate::backend::ComposeError;

/// Default lifetime of hosted images in seconds.
const DEFAULT_EXPIRATION_SECS: u32 = 600;

/// Turns local images into URLs the generation provider can fetch.
pub struct ImageHost {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    expiration_secs: u32,
    retry: RetryPolicy,
}

impl ImageHost {
    /// `api_url` is the hosting upload endpoint; `api_key` of `None`
    /// (or empty) disables hosting entirely and every image is inlined.
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            expiration_secs: DEFAULT_EXPIRATION_SECS,
            retry: RetryPolicy::default(),
        }
    }

    /// A reference the provider can fetch: hosted URL when possible,
    /// otherwise an inline data URI.
    pub async fn public_url(&self, path: &Path) -> Result<String, ComposeError> {
        if let Some(key) = self.api_key.clone() {
            match self.upload(&key, path).await {
                Ok(url) => return Ok(url),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Image hosting failed, inlining as data URI",
                    );
                }
            }
        }
        self.data_url(path)
    }

    /// Upload to the hosting service, retrying transient failures.
    async fn upload(&self, key: &str, path: &Path) -> Result<String, ComposeError> {
        let encoded = self.encode(path)?;
        self.retry
            .run(
                || self.upload_once(key, encoded.clone()),
                ComposeError::is_retryable,
            )
            .await
    }

    async fn upload_once(&self, key: &str, encoded: String) -> Result<String, ComposeError> {
        let form = [
            ("key", key.to_string()),
            ("image", encoded),
            ("expiration", self.expiration_secs.to_string()),
        ];
        let response = self.client.post(&self.api_url).form(&form).send().await?;

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

        let payload: serde_json::Value = response.json().await?;
        if payload["success"].as_bool() != Some(true) {
            return Err(ComposeError::Api {
                status: status.as_u16(),
                body: payload.to_string(),
            });
        }
        payload["data"]["url"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ComposeError::Api {
                status: status.as_u16(),
                body: "hosting response carried no url".to_string(),
            })
    }

    /// Inline fallback representation.
    fn data_url(&self, path: &Path) -> Result<String, ComposeError> {
        Ok(format!("data:image/png;base64,{}", self.encode(path)?))
    }

    fn encode(&self, path: &Path) -> Result<String, ComposeError> {
        let bytes = std::fs::read(path)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn missing_key_inlines_as_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"not-really-png")
            .unwrap();

        let host = ImageHost::new("https://hosting.invalid/upload".to_string(), None);
        let url = host.public_url(&path).await.unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn blank_key_counts_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        std::fs::write(&path, b"x").unwrap();

        let host = ImageHost::new(
            "https://hosting.invalid/upload".to_string(),
            Some("   ".to_string()),
        );
        let url = host.public_url(&path).await.unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn unreadable_file_is_an_error() {
        let host = ImageHost::new("https://hosting.invalid/upload".to_string(), None);
        let result = host.public_url(Path::new("/no/such/file.png")).await;
        assert!(matches!(result, Err(ComposeError::Io(_))));
    }
}
