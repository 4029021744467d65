use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use roomstage_compose::ComposeError;
use roomstage_core::CoreError;
use roomstage_vision::VisionError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain and provider errors and implements [`IntoResponse`]
/// to produce consistent JSON error bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `roomstage_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A vision-provider error that survived the adapter's degradation.
    #[error(transparent)]
    Vision(#[from] VisionError),

    /// A composition-backend error.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{id}' not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::QuotaExceeded { used, limit } => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "QUOTA_EXCEEDED",
                    format!("Trial quota exhausted: {used} of {limit} generations used"),
                ),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Vision provider errors ---
            AppError::Vision(vision) => match vision {
                VisionError::Unavailable { .. } => (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_UNAVAILABLE",
                    "Vision backend is unavailable, try again later".to_string(),
                ),
                other => {
                    tracing::error!(error = %other, "Vision provider error");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "Vision analysis failed".to_string(),
                    )
                }
            },

            // --- Composition backend errors ---
            AppError::Compose(compose) => match compose {
                ComposeError::Unavailable { .. } => (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_UNAVAILABLE",
                    "Generation backend is unavailable, try again later".to_string(),
                ),
                ComposeError::TaskFailed(reason) => (
                    StatusCode::BAD_GATEWAY,
                    "COMPOSITION_FAILED",
                    format!("Generation failed: {reason}"),
                ),
                ComposeError::Timeout { attempts } => (
                    StatusCode::GATEWAY_TIMEOUT,
                    "COMPOSITION_TIMEOUT",
                    format!("Generation did not finish within {attempts} polls"),
                ),
                other => {
                    tracing::error!(error = %other, "Composition error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
