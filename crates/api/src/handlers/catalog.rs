//! Handlers for the furniture catalog.

use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use roomstage_core::CoreError;
use roomstage_db::models::{CatalogItem, CreateCatalogItem};
use roomstage_db::repositories::CatalogRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::uploads::save_upload;

#[derive(Debug, Serialize)]
pub struct CatalogListResponse {
    pub items: Vec<CatalogItem>,
}

/// GET /api/v1/catalog
pub async fn list_items(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let items = CatalogRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: CatalogListResponse { items },
    }))
}

/// POST /api/v1/catalog
///
/// Multipart form: `name`, `item_type`, `style`, optional `description`
/// and `price`, plus the item image as `file` (transparency kept).
pub async fn add_item(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut name = None;
    let mut item_type = None;
    let mut style = None;
    let mut description = None;
    let mut price = None;
    let mut image_bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("name") => name = Some(read_text(field).await?),
            Some("item_type") => item_type = Some(read_text(field).await?),
            Some("style") => style = Some(read_text(field).await?),
            Some("description") => description = Some(read_text(field).await?),
            Some("price") => {
                let raw = read_text(field).await?;
                let parsed: f64 = raw.parse().map_err(|_| {
                    AppError::BadRequest(format!("price must be a number (got '{raw}')"))
                })?;
                price = Some(parsed);
            }
            Some("file") => {
                image_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("failed to read image: {e}")))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let (name, item_type, style) = match (name, item_type, style) {
        (Some(n), Some(t), Some(s)) => (n, t, s),
        _ => {
            return Err(AppError::BadRequest(
                "fields 'name', 'item_type' and 'style' are required".to_string(),
            ))
        }
    };
    let image_bytes =
        image_bytes.ok_or_else(|| AppError::BadRequest("field 'file' is required".to_string()))?;

    let image_path = save_upload(&image_bytes, &state.config.catalog_dir(), true)?;
    let filename = image_path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();

    let item = CatalogRepo::create(
        &state.pool,
        &CreateCatalogItem {
            name,
            item_type,
            style,
            image_path: image_path.display().to_string(),
            image_url: format!("/catalog/{filename}"),
            description,
            price,
        },
    )
    .await?;

    tracing::info!(item_id = %item.id, name = %item.name, "Catalog item added");
    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/catalog/{id}
///
/// Removes the item row; the image file is deleted best effort.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let item = CatalogRepo::find_by_id(&state.pool, &id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CatalogItem",
            id: id.clone(),
        }))?;

    if let Err(e) = std::fs::remove_file(&item.image_path) {
        tracing::warn!(path = %item.image_path, error = %e, "Could not delete catalog image");
    }
    CatalogRepo::delete(&state.pool, &id).await?;

    Ok(Json(DataResponse {
        data: serde_json::json!({ "deleted": id }),
    }))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart field: {e}")))
}
