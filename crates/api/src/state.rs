use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::PlacementEngine;
use crate::recommend::Recommender;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`. Cheaply cloneable; inner data sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: roomstage_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The placement pipeline: quota, analysis, dispatch, post-resize.
    pub engine: Arc<PlacementEngine>,
    /// Catalog recommendation service.
    pub recommender: Arc<Recommender>,
}
