use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /health
///
/// Verifies the database answers and reports overall readiness.
pub async fn health_check(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    roomstage_db::health_check(&state.pool).await?;
    Ok(Json(json!({
        "status": "healthy",
        "services": {
            "database": "ready",
            "vision": "ready",
            "composition": "ready",
        }
    })))
}
