//! Saving uploaded images to the data directory.

use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::AppError;

/// Decode an uploaded image and re-encode it as PNG under `dir` with a
/// fresh uuid filename.
///
/// Room photos are flattened onto white (any transparency is
/// meaningless there and RGB keeps them small); furniture images keep
/// their alpha channel, which the pixel compositor relies on.
pub fn save_upload(bytes: &[u8], dir: &Path, preserve_alpha: bool) -> Result<PathBuf, AppError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AppError::BadRequest(format!("file is not a decodable image: {e}")))?;

    let path = dir.join(format!("{}.png", uuid::Uuid::new_v4()));
    let result = if preserve_alpha {
        DynamicImage::ImageRgba8(img.to_rgba8()).save(&path)
    } else {
        flatten_onto_white(&img.to_rgba8()).save(&path)
    };
    result.map_err(|e| AppError::InternalError(format!("failed to save upload: {e}")))?;
    Ok(path)
}

/// Composite an RGBA image over an opaque white background, dropping
/// the alpha channel.
fn flatten_onto_white(img: &RgbaImage) -> DynamicImage {
    let mut canvas = RgbaImage::from_pixel(img.width(), img.height(), Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut canvas, img, 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8().into()
}
