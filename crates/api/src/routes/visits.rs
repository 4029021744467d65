//! Visit log route.
//!
//! ```text
//! GET /visits    most recent logged visits
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::visits;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/visits", get(visits::list_visits))
}
