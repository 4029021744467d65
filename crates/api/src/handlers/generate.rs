//! Handler for the generation endpoint.

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{Form, Json};

use roomstage_db::models::CreateVisit;
use roomstage_db::repositories::VisitRepo;

use crate::client_ip::{client_id, PeerAddr};
use crate::engine::GenerateParams;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/generate
///
/// Runs the full placement pipeline: quota check, analysis (with
/// deterministic degradation), manual overrides, composition dispatch
/// and result downscaling. Also appends to the visit log, best effort.
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    PeerAddr(peer): PeerAddr,
    Form(params): Form<GenerateParams>,
) -> AppResult<impl IntoResponse> {
    let client = client_id(&headers, peer);

    let visit = CreateVisit {
        ip_address: client.clone(),
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string(),
        path: "/api/v1/generate".to_string(),
        method: "POST".to_string(),
    };
    if let Err(e) = VisitRepo::record(&state.pool, &visit).await {
        tracing::warn!(error = %e, "Failed to record visit");
    }

    let result = state.engine.generate(&state.pool, &params, &client).await?;
    Ok(Json(DataResponse { data: result }))
}
