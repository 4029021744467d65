//! Upload routes.
//!
//! ```text
//! POST /room        upload a room photo
//! POST /furniture   upload a furniture photo (alpha preserved)
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/room", post(uploads::upload_room))
        .route("/furniture", post(uploads::upload_furniture))
}
