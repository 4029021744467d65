//! Repository for the `visits` log table.

use crate::models::visit::{CreateVisit, Visit};
use crate::DbPool;

/// Longest user-agent string stored; the rest is cut off.
const MAX_USER_AGENT_LEN: usize = 500;

/// Append-only visit log.
pub struct VisitRepo;

impl VisitRepo {
    /// Record one visit. The user agent is truncated to
    /// [`MAX_USER_AGENT_LEN`] characters.
    pub async fn record(pool: &DbPool, input: &CreateVisit) -> Result<(), sqlx::Error> {
        let user_agent: String = input.user_agent.chars().take(MAX_USER_AGENT_LEN).collect();
        sqlx::query(
            "INSERT INTO visits (ip_address, user_agent, path, method, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&input.ip_address)
        .bind(&user_agent)
        .bind(&input.path)
        .bind(&input.method)
        .bind(chrono::Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Most recent visits, newest first, capped at `limit`.
    pub async fn list_recent(pool: &DbPool, limit: i64) -> Result<Vec<Visit>, sqlx::Error> {
        sqlx::query_as::<_, Visit>(
            "SELECT id, ip_address, user_agent, path, method, created_at
             FROM visits ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
