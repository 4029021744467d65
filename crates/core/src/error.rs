/// Domain-level error type shared by all roomstage crates.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    #[error("Entity not found: {entity} '{id}'")]
    NotFound { entity: &'static str, id: String },

    /// Input failed validation and the request must be rejected.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The per-client trial quota is exhausted.
    #[error("Trial quota exhausted: {used} of {limit} generations used")]
    QuotaExceeded { used: i64, limit: i64 },

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
