//! The abstract vision capability and its error taxonomy.

use std::path::PathBuf;

use crate::prompts::VisionPrompt;

/// Errors from a vision backend.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The HTTP request itself failed (network, DNS, TLS).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend rejected the input (e.g. an unreadable image).
    /// Not retryable.
    #[error("Vision input rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The backend reported a maintenance or overload condition.
    /// Retryable with a bounded fixed-delay policy.
    #[error("Vision backend unavailable ({status}): {body}")]
    Unavailable { status: u16, body: String },

    /// The response carried no content at all.
    #[error("Vision response contained no content")]
    Empty,

    /// A local image could not be read for upload.
    #[error("Failed to read image '{path}': {source}")]
    Image {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl VisionError {
    /// Whether the retry policy should try the call again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VisionError::Unavailable { .. })
    }
}

/// One text prompt plus up to ~6 images in, free text out.
///
/// The returned text is expected to contain JSON, possibly inside a
/// markdown fence; parsing is the analyzer's job, not the client's.
#[async_trait::async_trait]
pub trait VisionClient: Send + Sync {
    async fn analyze(
        &self,
        prompt: &VisionPrompt,
        images: &[PathBuf],
    ) -> Result<String, VisionError>;
}
