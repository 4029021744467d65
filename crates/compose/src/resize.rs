//! Result-image downscaling.
//!
//! Every backend's output is bounded to the same maximum edge before
//! its URL is handed back, keeping response payloads uniform. Images
//! already within the bound are left untouched on disk.

use std::path::Path;

use image::imageops::FilterType;

use crate::backend::ComposeError;

/// Longest side allowed for a returned result image.
pub const MAX_RESULT_EDGE: u32 = 1200;

/// Downscale the image at `path` in place so its longest side is at
/// most `max_edge`, preserving aspect ratio and never upscaling.
/// Returns the final dimensions either way.
pub fn downscale_longest_side(path: &Path, max_edge: u32) -> Result<(u32, u32), ComposeError> {
    let img = image::open(path)?;
    let (w, h) = (img.width(), img.height());
    if w.max(h) <= max_edge {
        return Ok((w, h));
    }

    let (new_w, new_h) = if w >= h {
        let nh = (f64::from(h) * f64::from(max_edge) / f64::from(w)).round() as u32;
        (max_edge, nh.max(1))
    } else {
        let nw = (f64::from(w) * f64::from(max_edge) / f64::from(h)).round() as u32;
        (nw.max(1), max_edge)
    };

    tracing::debug!(from = ?(w, h), to = ?(new_w, new_h), "Downscaling result image");
    img.resize_exact(new_w, new_h, FilterType::Lanczos3).save(path)?;
    Ok((new_w, new_h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn save(path: &Path, w: u32, h: u32) {
        RgbaImage::from_pixel(w, h, Rgba([1, 2, 3, 255])).save(path).unwrap();
    }

    #[test]
    fn small_image_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.png");
        save(&path, 1200, 900);
        assert_eq!(downscale_longest_side(&path, 1200).unwrap(), (1200, 900));
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (1200, 900));
    }

    #[test]
    fn wide_image_scales_to_exact_bound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.png");
        save(&path, 2000, 1000);
        assert_eq!(downscale_longest_side(&path, 1200).unwrap(), (1200, 600));
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (1200, 600));
    }

    #[test]
    fn tall_image_bounds_its_height() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.png");
        save(&path, 1000, 2000);
        assert_eq!(downscale_longest_side(&path, 1200).unwrap(), (600, 1200));
    }
}
