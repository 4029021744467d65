//! Local alpha-compositing backend.
//!
//! No AI involved: the furniture image (with transparency) is scaled to
//! fit inside the placement rectangle and pasted onto the room photo.
//! The only backend whose `preserves_original` flag is true.

use std::path::PathBuf;

use image::imageops::{self, FilterType};
use image::DynamicImage;

use roomstage_core::geometry::ROTATION_QUARTER;

use crate::backend::{ComposeBackend, ComposeError, ComposeRequest, CompositionMode};

/// Scale-and-paste composition of a single furniture image.
pub struct PixelCompositeBackend;

impl PixelCompositeBackend {
    /// Fit `(fw, fh)` inside `(tw, th)` preserving aspect ratio, scaling
    /// by whichever dimension is constraining.
    fn fit(fw: u32, fh: u32, tw: u32, th: u32) -> (u32, u32) {
        let f_aspect = f64::from(fw) / f64::from(fh);
        let t_aspect = f64::from(tw) / f64::from(th);
        if f_aspect > t_aspect {
            let h = (f64::from(tw) / f_aspect).round() as u32;
            (tw, h.max(1))
        } else {
            let w = (f64::from(th) * f_aspect).round() as u32;
            (w.max(1), th)
        }
    }
}

#[async_trait::async_trait]
impl ComposeBackend for PixelCompositeBackend {
    fn model_name(&self) -> &str {
        "pixel-composite"
    }

    fn preserves_original(&self) -> bool {
        true
    }

    async fn compose(&self, request: &ComposeRequest) -> Result<PathBuf, ComposeError> {
        if request.mode != CompositionMode::Place || request.furniture_paths.len() != 1 {
            return Err(ComposeError::Unsupported(
                "pixel composite handles exactly one item in place mode".to_string(),
            ));
        }

        let room = image::open(&request.room_path)?.to_rgba8();
        let mut furniture = image::open(&request.furniture_paths[0])?.to_rgba8();
        let placement = &request.analysis.placement;
        if placement.rotation == ROTATION_QUARTER {
            furniture = imageops::rotate90(&furniture);
        }

        let (room_w, room_h) = room.dimensions();
        let rect = placement.rect;

        // Target area from the percent rectangle, capped at the canvas.
        let target_w = ((f64::from(room_w) * rect.width_percent / 100.0).round() as u32)
            .clamp(1, room_w);
        let target_h = ((f64::from(room_h) * rect.height_percent / 100.0).round() as u32)
            .clamp(1, room_h);

        let (new_w, new_h) = Self::fit(furniture.width(), furniture.height(), target_w, target_h);
        let resized = imageops::resize(&furniture, new_w, new_h, FilterType::Lanczos3);

        // Center at the rectangle's center, then clamp fully inside the
        // room canvas.
        let x = (f64::from(room_w) * rect.x_percent / 100.0 - f64::from(new_w) / 2.0).round();
        let y = (f64::from(room_h) * rect.y_percent / 100.0 - f64::from(new_h) / 2.0).round();
        let x = (x as i64).clamp(0, i64::from(room_w - new_w));
        let y = (y as i64).clamp(0, i64::from(room_h - new_h));

        tracing::debug!(
            furniture_size = ?(new_w, new_h),
            position = ?(x, y),
            "Compositing furniture onto room",
        );

        let mut canvas = room;
        imageops::overlay(&mut canvas, &resized, x, y);

        let output = request
            .output_dir
            .join(format!("result_{}.png", uuid::Uuid::new_v4()));
        DynamicImage::ImageRgba8(canvas).to_rgb8().save(&output)?;
        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
