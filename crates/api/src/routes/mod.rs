//! Route definitions, one module per resource.

pub mod catalog;
pub mod generate;
pub mod health;
pub mod recommendations;
pub mod uploads;
pub mod visits;

use axum::Router;

use crate::state::AppState;

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/uploads", uploads::router())
        .merge(generate::router())
        .merge(catalog::router())
        .merge(recommendations::router())
        .merge(visits::router())
}
