//! Repository for the `trial_usage` counter table.

use crate::DbPool;

/// Per-client generation usage counters.
///
/// The guard reads the count before a generation and increments it after
/// a successful one; the two steps are deliberately separate calls and
/// not atomic against concurrent requests from the same client.
pub struct TrialUsageRepo;

impl TrialUsageRepo {
    /// Current usage count for a client; 0 when the client is unknown.
    pub async fn count(pool: &DbPool, client_identifier: &str) -> Result<i64, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT count FROM trial_usage WHERE client_identifier = ?")
                .bind(client_identifier)
                .fetch_optional(pool)
                .await?;
        Ok(row.map_or(0, |(c,)| c))
    }

    /// Record one successful generation, returning the new count.
    pub async fn increment(pool: &DbPool, client_identifier: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "INSERT INTO trial_usage (client_identifier, count) VALUES (?, 1)
             ON CONFLICT(client_identifier) DO UPDATE SET count = count + 1
             RETURNING count",
        )
        .bind(client_identifier)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
