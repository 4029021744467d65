//! Recommendation route.
//!
//! ```text
//! POST /recommendations    complementary catalog items for a placement
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::recommendations;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/recommendations", post(recommendations::recommend))
}
