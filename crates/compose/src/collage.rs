//! Renders the multi-item reference collage.
//!
//! Layout math lives in `roomstage_core::layout`; this module only
//! rasterizes it: scaled furniture images in a row, vertically
//! centered, on an opaque white canvas.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use roomstage_core::layout::{collage_layout, CollageLayout};

use crate::backend::ComposeError;

/// Render the collage for `paths` (left to right, in order) into
/// `output`. Returns the computed layout for callers that want the
/// slot geometry.
pub fn render_collage(
    paths: &[PathBuf],
    output: &Path,
    max_item_height: u32,
    padding: u32,
) -> Result<CollageLayout, ComposeError> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        images.push(image::open(path)?.to_rgba8());
    }
    let dims: Vec<(u32, u32)> = images.iter().map(|i| i.dimensions()).collect();
    let layout = collage_layout(&dims, max_item_height, padding);

    let mut canvas = RgbaImage::from_pixel(
        layout.canvas_width,
        layout.canvas_height,
        Rgba([255, 255, 255, 255]),
    );

    for (img, slot) in images.iter().zip(&layout.slots) {
        if img.dimensions() == (slot.width, slot.height) {
            imageops::overlay(&mut canvas, img, i64::from(slot.x), i64::from(slot.y));
        } else {
            let scaled = imageops::resize(img, slot.width, slot.height, FilterType::Lanczos3);
            imageops::overlay(&mut canvas, &scaled, i64::from(slot.x), i64::from(slot.y));
        }
    }

    canvas.save(output)?;
    tracing::debug!(
        items = paths.len(),
        canvas = ?(layout.canvas_width, layout.canvas_height),
        output = %output.display(),
        "Collage rendered",
    );
    Ok(layout)
}
