//! Handler for catalog recommendations.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use roomstage_core::analysis::{FurnitureDescription, RoomAnalysis};
use roomstage_db::repositories::CatalogRepo;

use crate::error::AppResult;
use crate::recommend::Recommendation;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub furniture_analysis: FurnitureDescription,
    #[serde(default)]
    pub room_analysis: RoomAnalysis,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<Recommendation>,
}

/// POST /api/v1/recommendations
///
/// Suggests complementary catalog items for a just-placed furniture
/// item. Never fails on model errors; degrades to keyword matching.
pub async fn recommend(
    State(state): State<AppState>,
    Json(input): Json<RecommendRequest>,
) -> AppResult<impl IntoResponse> {
    let catalog = CatalogRepo::list(&state.pool).await?;
    let recommendations = state
        .recommender
        .recommend(&input.furniture_analysis, &input.room_analysis, &catalog)
        .await;

    Ok(Json(DataResponse {
        data: RecommendResponse { recommendations },
    }))
}
