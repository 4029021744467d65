//! Layout math for the multi-item reference collage and the placement
//! clauses that describe it.
//!
//! Multi-item generative composition references every furniture image
//! through one side-by-side montage, so a request costs one generation
//! call regardless of item count. The collage's left-to-right order is
//! positional ground truth: clause `i` of the generation instructions
//! must describe the item at slot `i` of the row.

use crate::analysis::{fallback_rect, PlacementAnalysis};
use crate::geometry::PlacementRectangle;

/// Default cap on a collage item's height in pixels.
pub const COLLAGE_MAX_ITEM_HEIGHT: u32 = 512;
/// Default padding between and around collage items in pixels.
pub const COLLAGE_PADDING: u32 = 40;

/// Where one scaled furniture image lands on the collage canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollageSlot {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Canvas dimensions plus one slot per input image, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub slots: Vec<CollageSlot>,
}

/// Compute the collage layout for images of the given pixel dimensions.
///
/// Each image is scaled so its height is at most `max_item_height`,
/// preserving aspect ratio and never upscaling. The canvas is
/// `sum(scaled widths) + padding * (count + 1)` wide and
/// `max(scaled heights) + 2 * padding` tall; items run left to right,
/// vertically centered.
pub fn collage_layout(dims: &[(u32, u32)], max_item_height: u32, padding: u32) -> CollageLayout {
    let scaled: Vec<(u32, u32)> = dims
        .iter()
        .map(|&(w, h)| scale_to_height(w, h, max_item_height))
        .collect();

    let content_width: u32 = scaled.iter().map(|&(w, _)| w).sum();
    let tallest = scaled.iter().map(|&(_, h)| h).max().unwrap_or(0);

    let canvas_width = content_width + padding * (dims.len() as u32 + 1);
    let canvas_height = tallest + 2 * padding;

    let mut slots = Vec::with_capacity(scaled.len());
    let mut x = padding;
    for (w, h) in scaled {
        slots.push(CollageSlot {
            x,
            y: (canvas_height - h) / 2,
            width: w,
            height: h,
        });
        x += w + padding;
    }

    CollageLayout {
        canvas_width,
        canvas_height,
        slots,
    }
}

/// Scale `(w, h)` down so `h <= max_height`, preserving aspect ratio.
/// Images already within the cap are returned unchanged.
fn scale_to_height(w: u32, h: u32, max_height: u32) -> (u32, u32) {
    if h <= max_height || h == 0 {
        return (w, h);
    }
    let scaled_w = ((w as f64) * (max_height as f64) / (h as f64)).round() as u32;
    (scaled_w.max(1), max_height)
}

// ---------------------------------------------------------------------------
// Placement clauses
// ---------------------------------------------------------------------------

/// Human word for a 0-based slot in a row of `count` items.
fn row_position(index: usize, count: usize) -> String {
    if count == 1 {
        "the only item in the reference image".to_string()
    } else if index == 0 {
        "leftmost".to_string()
    } else if index + 1 == count {
        "rightmost".to_string()
    } else {
        format!("number {} from the left", index + 1)
    }
}

/// Build one placement clause per furniture image.
///
/// Clause `index` looks up `furniture_items[index]`; a missing entry is
/// backfilled with the deterministic fallback rectangle and entries
/// beyond `item_count` are ignored, so the clause count always equals
/// the number of furniture images regardless of what the vision model
/// returned.
pub fn describe_placements(analysis: &PlacementAnalysis, item_count: usize) -> String {
    let mut clauses = Vec::with_capacity(item_count);
    for index in 0..item_count {
        let item = analysis
            .furniture_items
            .iter()
            .find(|it| it.index == index);
        let rect: PlacementRectangle = item
            .map(|it| it.placement)
            .unwrap_or_else(|| fallback_rect(index, item_count));
        let item_type = item.map_or("furniture item", |it| it.item_type.as_str());
        let color = item.map_or("neutral", |it| it.color.as_str());

        clauses.push(format!(
            "Item {n} ({pos}): {color} {item_type} - place in the room centered at \
             {x:.0}% from the left and {y:.0}% from the top, filling an area about \
             {w:.0}% wide and {h:.0}% tall.",
            n = index + 1,
            pos = row_position(index, item_count),
            x = rect.x_percent,
            y = rect.y_percent,
            w = rect.width_percent,
            h = rect.height_percent,
        ));
    }
    clauses.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
