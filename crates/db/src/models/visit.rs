use chrono::{DateTime, Utc};
use serde::Serialize;

/// One logged API visit.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Visit {
    pub id: i64,
    pub ip_address: String,
    pub user_agent: String,
    pub path: String,
    pub method: String,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a visit.
#[derive(Debug, Clone)]
pub struct CreateVisit {
    pub ip_address: String,
    pub user_agent: String,
    pub path: String,
    pub method: String,
}
