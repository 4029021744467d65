use serde::Serialize;

/// Per-client generation counter. Incremented once per successful
/// generation, never decremented; lives as long as the database file.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrialUsage {
    pub client_identifier: String,
    pub count: i64,
}
