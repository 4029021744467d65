//! The shared composition contract and its error taxonomy.

use std::path::PathBuf;

use roomstage_core::analysis::PlacementAnalysis;

/// How the furniture should enter the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionMode {
    /// Insert into empty space at the analysis' placement rectangle.
    Place,
    /// Swap an item already present in the room; the optional hint names
    /// what to swap and is passed through to the provider verbatim. No
    /// placement geometry applies in this mode.
    Replace { hint: Option<String> },
}

/// One composition job: a room, 1 to 5 furniture images, the resolved
/// analysis and a directory for the result and any temp files.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub room_path: PathBuf,
    pub furniture_paths: Vec<PathBuf>,
    pub mode: CompositionMode,
    pub analysis: PlacementAnalysis,
    pub output_dir: PathBuf,
}

/// Errors from composition backends.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// The HTTP request itself failed (network, DNS, TLS).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-retryable API error.
    #[error("Generation API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The provider reported maintenance or overload; retryable.
    #[error("Generation backend unavailable ({status}): {body}")]
    Unavailable { status: u16, body: String },

    /// The generation task itself failed; carries the provider's reason.
    #[error("Generation task failed: {0}")]
    TaskFailed(String),

    /// Polling exceeded its attempt bound without a terminal state.
    #[error("Timed out waiting for generation result after {attempts} polls")]
    Timeout { attempts: u32 },

    /// The backend cannot express this request (wrong mode or item
    /// count for its capabilities).
    #[error("Unsupported composition request: {0}")]
    Unsupported(String),

    /// Local image decoding or encoding failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ComposeError {
    /// Whether the bounded retry policy should try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ComposeError::Unavailable { .. })
    }
}

/// A composition strategy.
///
/// `preserves_original` is a static capability flag: true only when the
/// backend leaves furniture pixels untouched, never a runtime
/// measurement of the produced image.
#[async_trait::async_trait]
pub trait ComposeBackend: Send + Sync {
    /// Provider/model identifier reported back to the caller.
    fn model_name(&self) -> &str;

    /// Whether this backend keeps the furniture pixels identical.
    fn preserves_original(&self) -> bool;

    /// Produce the composite, returning the result image path inside
    /// `request.output_dir`.
    async fn compose(&self, request: &ComposeRequest) -> Result<PathBuf, ComposeError>;
}
