//! Handler for the visit log.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use roomstage_db::models::Visit;
use roomstage_db::repositories::VisitRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default and maximum number of visits returned.
const DEFAULT_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct VisitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct VisitListResponse {
    pub visits: Vec<Visit>,
}

/// GET /api/v1/visits
pub async fn list_visits(
    State(state): State<AppState>,
    Query(query): Query<VisitQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, DEFAULT_LIMIT);
    let visits = VisitRepo::list_recent(&state.pool, limit).await?;
    Ok(Json(DataResponse {
        data: VisitListResponse { visits },
    }))
}
