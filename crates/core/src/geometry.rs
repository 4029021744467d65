//! Placement geometry: the normalized placement rectangle, rotation and
//! wall-alignment validation, and manual-box resolution.
//!
//! All placement coordinates are percentages of the room image's
//! dimensions, with `x_percent`/`y_percent` addressing the rectangle's
//! *center*. Raw pixel input ([`ManualBox`]) is converted exactly once
//! and never stored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

/// Furniture shown in its original orientation.
pub const ROTATION_NONE: i32 = 0;
/// Furniture turned a quarter-turn (vertical vs horizontal orientation).
pub const ROTATION_QUARTER: i32 = 90;

/// All rotation values the service accepts.
pub const VALID_ROTATIONS: &[i32] = &[ROTATION_NONE, ROTATION_QUARTER];

/// Validate that a requested furniture rotation is one of the supported
/// values, returning it unchanged.
pub fn validate_rotation(value: i32) -> Result<i32, CoreError> {
    if VALID_ROTATIONS.contains(&value) {
        Ok(value)
    } else {
        Err(CoreError::Validation(format!(
            "furniture_rotation must be one of: 0, 90 (got {value})"
        )))
    }
}

// ---------------------------------------------------------------------------
// Wall alignment
// ---------------------------------------------------------------------------

/// Which wall the placed furniture should sit flush against.
///
/// `Auto` is a request to infer one of the concrete values from manual-box
/// margins; [`infer_wall_alignment`] never returns it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallAlignment {
    #[default]
    Auto,
    Left,
    Right,
    Back,
}

impl WallAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            WallAlignment::Auto => "auto",
            WallAlignment::Left => "left",
            WallAlignment::Right => "right",
            WallAlignment::Back => "back",
        }
    }
}

impl fmt::Display for WallAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WallAlignment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(WallAlignment::Auto),
            "left" => Ok(WallAlignment::Left),
            "right" => Ok(WallAlignment::Right),
            "back" => Ok(WallAlignment::Back),
            other => Err(CoreError::Validation(format!(
                "wall_alignment must be one of: auto, left, right, back (got '{other}')"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Placement rectangle
// ---------------------------------------------------------------------------

/// Target area for a furniture item, as percentages of the room image.
///
/// `x_percent`/`y_percent` are the rectangle's center. The rectangle may
/// extend past the image edges (center minus half-width is not clamped);
/// composition backends clamp independently when they rasterize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRectangle {
    pub x_percent: f64,
    pub y_percent: f64,
    pub width_percent: f64,
    pub height_percent: f64,
}

impl PlacementRectangle {
    /// A centered rectangle covering `width_percent` by `height_percent`
    /// of the room. Used by the hardcoded default analysis.
    pub fn centered(width_percent: f64, height_percent: f64) -> Self {
        Self {
            x_percent: 50.0,
            y_percent: 50.0,
            width_percent,
            height_percent,
        }
    }
}

impl Default for PlacementRectangle {
    fn default() -> Self {
        Self::centered(30.0, 30.0)
    }
}

// ---------------------------------------------------------------------------
// Manual box
// ---------------------------------------------------------------------------

/// A user-drawn rectangle in original room-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualBox {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl ManualBox {
    /// Center point of the box in pixels.
    pub fn center(&self) -> (i64, i64) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Clamp the box so it lies inside a `room_w` by `room_h` image:
    /// `0 <= x <= room_w - 1` and `1 <= w <= room_w - x` (same for y/h).
    pub fn clamped(&self, room_w: u32, room_h: u32) -> ManualBox {
        let x = self.x.clamp(0, i64::from(room_w) - 1);
        let y = self.y.clamp(0, i64::from(room_h) - 1);
        let w = self.w.clamp(1, i64::from(room_w) - x);
        let h = self.h.clamp(1, i64::from(room_h) - y);
        ManualBox { x, y, w, h }
    }

    /// Convert to a center-based percent rectangle relative to the room.
    ///
    /// Callers are expected to clamp first; the conversion itself is a
    /// plain linear map.
    pub fn to_placement(&self, room_w: u32, room_h: u32) -> PlacementRectangle {
        let rw = f64::from(room_w);
        let rh = f64::from(room_h);
        PlacementRectangle {
            x_percent: (self.x as f64 + self.w as f64 / 2.0) / rw * 100.0,
            y_percent: (self.y as f64 + self.h as f64 / 2.0) / rh * 100.0,
            width_percent: self.w as f64 / rw * 100.0,
            height_percent: self.h as f64 / rh * 100.0,
        }
    }
}

/// Resolve the manual position (pixel point) a request implies, if any.
///
/// Only `mode == "manual"` carries a manual position. A fully specified
/// box wins over the legacy single-click point; its center becomes the
/// position.
pub fn resolve_manual_position(
    mode: &str,
    manual_box: Option<ManualBox>,
    manual_point: Option<(i64, i64)>,
) -> Option<(i64, i64)> {
    if mode != "manual" {
        return None;
    }
    if let Some(b) = manual_box {
        return Some(b.center());
    }
    manual_point
}

/// Infer which wall a manually drawn box is closest to.
///
/// Margins are measured from the box to the left edge, right edge and
/// top edge of the room. The smallest margin wins, checked in the order
/// right, then left; everything else (including ties and top-dominant
/// boxes) resolves to the back wall. The comparison order is load-bearing
/// and must not be reordered.
pub fn infer_wall_alignment(bbox: ManualBox, room_w: u32) -> WallAlignment {
    let left_margin = bbox.x;
    let right_margin = i64::from(room_w) - (bbox.x + bbox.w);
    let top_margin = bbox.y;

    let m = left_margin.min(right_margin).min(top_margin);
    if m == right_margin {
        WallAlignment::Right
    } else if m == left_margin {
        WallAlignment::Left
    } else {
        WallAlignment::Back
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- rotation --

    #[test]
    fn rotation_zero_and_quarter_accepted() {
        assert_eq!(validate_rotation(0).unwrap(), 0);
        assert_eq!(validate_rotation(90).unwrap(), 90);
    }

    #[test]
    fn other_rotations_rejected() {
        for bad in [45, -90, 180, 270, 1] {
            assert!(validate_rotation(bad).is_err(), "rotation {bad} accepted");
        }
    }

    // -- wall alignment parsing --

    #[test]
    fn wall_alignment_round_trips() {
        for (s, v) in [
            ("auto", WallAlignment::Auto),
            ("left", WallAlignment::Left),
            ("right", WallAlignment::Right),
            ("back", WallAlignment::Back),
        ] {
            assert_eq!(s.parse::<WallAlignment>().unwrap(), v);
            assert_eq!(v.as_str(), s);
        }
    }

    #[test]
    fn unknown_wall_alignment_rejected() {
        assert!("front".parse::<WallAlignment>().is_err());
    }

    // -- wall inference --

    #[test]
    fn box_near_left_edge_aligns_left() {
        // left_margin 10, right_margin 790, top_margin 300
        let b = ManualBox { x: 10, y: 300, w: 200, h: 200 };
        assert_eq!(infer_wall_alignment(b, 1000), WallAlignment::Left);
    }

    #[test]
    fn box_near_right_edge_aligns_right() {
        let b = ManualBox { x: 780, y: 300, w: 200, h: 200 };
        assert_eq!(infer_wall_alignment(b, 1000), WallAlignment::Right);
    }

    #[test]
    fn top_dominant_box_aligns_back_not_right() {
        // left 700, right 100, top 10: top is smallest, falls through to back
        // even though the right margin is also small.
        let b = ManualBox { x: 700, y: 10, w: 200, h: 200 };
        assert_eq!(infer_wall_alignment(b, 1000), WallAlignment::Back);
    }

    #[test]
    fn left_right_tie_resolves_right() {
        // left == right == 100, top 500: min() matches right first.
        let b = ManualBox { x: 100, y: 500, w: 800, h: 100 };
        assert_eq!(infer_wall_alignment(b, 1000), WallAlignment::Right);
    }

    // -- manual position resolution --

    #[test]
    fn auto_mode_has_no_manual_position() {
        let b = ManualBox { x: 10, y: 10, w: 100, h: 100 };
        assert_eq!(resolve_manual_position("auto", Some(b), Some((5, 5))), None);
    }

    #[test]
    fn full_box_beats_legacy_point() {
        let b = ManualBox { x: 100, y: 200, w: 50, h: 80 };
        assert_eq!(
            resolve_manual_position("manual", Some(b), Some((5, 5))),
            Some((125, 240))
        );
    }

    #[test]
    fn legacy_point_used_without_box() {
        assert_eq!(
            resolve_manual_position("manual", None, Some((300, 400))),
            Some((300, 400))
        );
    }

    #[test]
    fn manual_mode_without_inputs_is_none() {
        assert_eq!(resolve_manual_position("manual", None, None), None);
    }

    // -- clamping and conversion --

    #[test]
    fn box_inside_room_is_unchanged() {
        let b = ManualBox { x: 100, y: 100, w: 200, h: 150 };
        assert_eq!(b.clamped(1000, 800), b);
    }

    #[test]
    fn box_past_edges_is_pulled_inside() {
        let b = ManualBox { x: -50, y: 700, w: 5000, h: 5000 };
        let c = b.clamped(1000, 800);
        assert_eq!(c, ManualBox { x: 0, y: 700, w: 1000, h: 100 });
    }

    #[test]
    fn clamped_conversion_keeps_center_in_range() {
        // Boxes overlapping the room bounds in every direction.
        let cases = [
            ManualBox { x: -200, y: -200, w: 400, h: 400 },
            ManualBox { x: 900, y: 700, w: 400, h: 400 },
            ManualBox { x: 0, y: 0, w: 1, h: 1 },
            ManualBox { x: 999, y: 799, w: 50, h: 50 },
        ];
        for b in cases {
            let p = b.clamped(1000, 800).to_placement(1000, 800);
            assert!((0.0..=100.0).contains(&p.x_percent), "{p:?}");
            assert!((0.0..=100.0).contains(&p.y_percent), "{p:?}");
            assert!(p.width_percent > 0.0 && p.height_percent > 0.0, "{p:?}");
        }
    }

    #[test]
    fn conversion_matches_hand_computed_percents() {
        let b = ManualBox { x: 100, y: 200, w: 200, h: 100 };
        let p = b.to_placement(1000, 800);
        assert_eq!(p.x_percent, 20.0);
        assert_eq!(p.y_percent, 31.25);
        assert_eq!(p.width_percent, 20.0);
        assert_eq!(p.height_percent, 12.5);
    }
}
