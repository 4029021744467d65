use serde::{Deserialize, Serialize};

/// A furniture item offered for placement, with its background-free
/// image on disk and the public URL it is served from.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub item_type: String,
    pub style: String,
    pub image_path: String,
    pub image_url: String,
    pub description: Option<String>,
    pub price: Option<f64>,
}

/// Input for creating a catalog item; the id is assigned by the repo.
#[derive(Debug, Clone)]
pub struct CreateCatalogItem {
    pub name: String,
    pub item_type: String,
    pub style: String,
    pub image_path: String,
    pub image_url: String,
    pub description: Option<String>,
    pub price: Option<f64>,
}
