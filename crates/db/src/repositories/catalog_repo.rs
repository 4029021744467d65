//! Repository for the `catalog_items` table.

use crate::models::catalog::{CatalogItem, CreateCatalogItem};
use crate::DbPool;

/// Column list for catalog queries.
const COLUMNS: &str = "id, name, item_type, style, image_path, image_url, description, price";

/// CRUD operations for catalog items.
pub struct CatalogRepo;

impl CatalogRepo {
    /// Insert a new item with a fresh uuid, returning the created row.
    pub async fn create(
        pool: &DbPool,
        input: &CreateCatalogItem,
    ) -> Result<CatalogItem, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let query = format!(
            "INSERT INTO catalog_items
                (id, name, item_type, style, image_path, image_url, description, price)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CatalogItem>(&query)
            .bind(&id)
            .bind(&input.name)
            .bind(&input.item_type)
            .bind(&input.style)
            .bind(&input.image_path)
            .bind(&input.image_url)
            .bind(&input.description)
            .bind(input.price)
            .fetch_one(pool)
            .await
    }

    /// All catalog items in insertion order.
    pub async fn list(pool: &DbPool) -> Result<Vec<CatalogItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM catalog_items ORDER BY rowid");
        sqlx::query_as::<_, CatalogItem>(&query).fetch_all(pool).await
    }

    /// Look an item up by id.
    pub async fn find_by_id(
        pool: &DbPool,
        id: &str,
    ) -> Result<Option<CatalogItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM catalog_items WHERE id = ?");
        sqlx::query_as::<_, CatalogItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an item. Returns `true` if a row was removed.
    pub async fn delete(pool: &DbPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM catalog_items WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
