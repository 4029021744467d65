//! Handlers for image uploads.

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::uploads::save_upload;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_path: String,
    pub filename: String,
}

/// POST /api/v1/uploads/room
///
/// Stores a room photo, flattened to RGB.
pub async fn upload_room(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    store(state, multipart, false).await
}

/// POST /api/v1/uploads/furniture
///
/// Stores a furniture photo. Transparency is kept for the pixel
/// compositor; background removal itself is an external concern.
pub async fn upload_furniture(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    store(state, multipart, true).await
}

async fn store(
    state: AppState,
    mut multipart: Multipart,
    preserve_alpha: bool,
) -> AppResult<Json<DataResponse<UploadResponse>>> {
    let bytes = read_image_field(&mut multipart).await?;
    let path = save_upload(&bytes, &state.config.uploads_dir(), preserve_alpha)?;
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();

    tracing::info!(filename = %filename, bytes = bytes.len(), "Image uploaded");
    Ok(Json(DataResponse {
        data: UploadResponse {
            file_path: path.display().to_string(),
            filename,
        },
    }))
}

/// Pull the `file` field out of the multipart body, checking it claims
/// to be an image.
async fn read_image_field(multipart: &mut Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if let Some(content_type) = field.content_type() {
            if !content_type.starts_with("image/") {
                return Err(AppError::BadRequest(
                    "the uploaded file must be an image".to_string(),
                ));
            }
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;
        return Ok(bytes.to_vec());
    }
    Err(AppError::BadRequest(
        "multipart field 'file' is required".to_string(),
    ))
}
