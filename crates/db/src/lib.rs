//! SQLite persistence for the roomstage service.
//!
//! Three small append-mostly stores: per-client trial usage counters,
//! the furniture catalog, and the visit log. Repositories are stateless
//! unit structs operating on a shared [`DbPool`]; row types live in
//! [`models`]. No store requires transactions; whatever atomicity the
//! driver provides natively is all the service relies on.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub mod models;
pub mod repositories;

/// Shared connection pool alias used across the workspace.
pub type DbPool = sqlx::SqlitePool;

/// Create a connection pool for `database_url` (e.g.
/// `sqlite://data/roomstage.db`), creating the file if it is missing.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Create the service's tables if they do not exist yet.
///
/// Run once at startup, before the first request.
pub async fn init_schema(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS trial_usage (
            client_identifier TEXT PRIMARY KEY,
            count INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS catalog_items (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            item_type TEXT NOT NULL,
            style TEXT NOT NULL,
            image_path TEXT NOT NULL,
            image_url TEXT NOT NULL,
            description TEXT,
            price REAL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS visits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ip_address TEXT NOT NULL,
            user_agent TEXT NOT NULL,
            path TEXT NOT NULL,
            method TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
