//! Catalog routes.
//!
//! ```text
//! GET    /catalog         list items
//! POST   /catalog         add an item (multipart with image)
//! DELETE /catalog/{id}    remove an item
//! ```

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(catalog::list_items).post(catalog::add_item))
        .route("/catalog/{id}", delete(catalog::delete_item))
}
