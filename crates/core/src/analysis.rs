//! The placement-analysis payload: what the vision model (or its
//! deterministic stand-ins) says about a room and the furniture going
//! into it.
//!
//! One [`PlacementAnalysis`] is created per generation request and
//! mutated in place as overrides are merged: the manual box supersedes
//! any AI-suggested placement, and the request's rotation and wall
//! alignment are written last so they always win. Analyses are never
//! persisted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::{ManualBox, PlacementRectangle, WallAlignment, ROTATION_NONE};

/// Reasoning tag attached to a placement that came from a user-drawn
/// rectangle rather than the vision model.
pub const MANUAL_BOX_REASONING: &str =
    "User selected target rectangle (bbox). Place furniture inside this area.";

/// Free-form description of the room.
///
/// `style` and `lighting` are the fields prompt builders rely on; the
/// vision model may return more, which is preserved in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAnalysis {
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_lighting")]
    pub lighting: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RoomAnalysis {
    fn default() -> Self {
        Self {
            style: default_style(),
            lighting: default_lighting(),
            extra: Map::new(),
        }
    }
}

fn default_style() -> String {
    "modern".to_string()
}

fn default_lighting() -> String {
    "natural lighting".to_string()
}

/// Description of a single furniture image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FurnitureDescription {
    #[serde(rename = "type", default = "default_item_type")]
    pub item_type: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_size: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Default for FurnitureDescription {
    fn default() -> Self {
        Self {
            item_type: default_item_type(),
            color: default_color(),
            style: default_style(),
            estimated_size: None,
            features: Vec::new(),
        }
    }
}

fn default_item_type() -> String {
    "furniture item".to_string()
}

fn default_color() -> String {
    "neutral".to_string()
}

/// The root placement slot: target rectangle plus the finalized
/// orientation fields the request always overwrites.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlacementSpec {
    #[serde(flatten)]
    pub rect: PlacementRectangle,
    #[serde(default)]
    pub rotation: i32,
    #[serde(default)]
    pub wall_alignment: WallAlignment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Per-item analysis for multi-furniture requests. `index` matches the
/// item's position in the furniture image list (0-based).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FurnitureItemAnalysis {
    pub index: usize,
    #[serde(rename = "type", default = "default_item_type")]
    pub item_type: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default)]
    pub placement: PlacementRectangle,
    #[serde(default)]
    pub rotation: i32,
    #[serde(default)]
    pub wall_alignment: WallAlignment,
}

/// Root aggregate produced by the analysis step and consumed by the
/// composition backends. Owned exclusively by one generation request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlacementAnalysis {
    #[serde(default)]
    pub room_analysis: RoomAnalysis,
    #[serde(default)]
    pub furniture_analysis: FurnitureDescription,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub furniture_items: Vec<FurnitureItemAnalysis>,
    /// Single-item convenience copy of the target placement.
    #[serde(default)]
    pub placement: PlacementSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_composition: Option<String>,
}

impl PlacementAnalysis {
    /// Overwrite the placement with a user-drawn pixel rectangle.
    ///
    /// The box is clamped into the room bounds, converted to percent
    /// coordinates and tagged as user-selected. Manual input always wins
    /// over whatever the analysis step proposed; callers must invoke
    /// this strictly after analysis and strictly before
    /// [`finalize_orientation`](Self::finalize_orientation).
    pub fn apply_manual_box(&mut self, bbox: ManualBox, room_w: u32, room_h: u32) {
        let clamped = bbox.clamped(room_w, room_h);
        self.placement.rect = clamped.to_placement(room_w, room_h);
        self.placement.reasoning = Some(MANUAL_BOX_REASONING.to_string());
    }

    /// Write the request's validated rotation and wall alignment into the
    /// placement. Runs last so the final values always win over anything
    /// the analysis step proposed.
    pub fn finalize_orientation(&mut self, rotation: i32, wall_alignment: WallAlignment) {
        self.placement.rotation = rotation;
        self.placement.wall_alignment = wall_alignment;
    }
}

// ---------------------------------------------------------------------------
// Deterministic degradation
// ---------------------------------------------------------------------------

/// Target rectangle for item `index` of `count` when no vision analysis
/// is available.
///
/// Items spread left to right across the central 50% of the room width
/// and alternate between two rows, with sizes shrinking as the count
/// grows, so the degenerate layout never overlaps by construction. For a
/// single item the divisor `max(1, count - 1)` is 1, which puts it at
/// x = 25, not centered.
pub fn fallback_rect(index: usize, count: usize) -> PlacementRectangle {
    let n = count.max(1);
    let spread = count.saturating_sub(1).max(1);
    PlacementRectangle {
        x_percent: 25.0 + (index as f64) * 50.0 / spread as f64,
        y_percent: 55.0 + ((index % 2) as f64) * 8.0,
        width_percent: 30.0 / n as f64,
        height_percent: 25.0 / n as f64,
    }
}

/// Per-item fallback analysis entry built from [`fallback_rect`].
pub fn fallback_item(index: usize, count: usize) -> FurnitureItemAnalysis {
    FurnitureItemAnalysis {
        index,
        item_type: default_item_type(),
        color: default_color(),
        style: default_style(),
        placement: fallback_rect(index, count),
        rotation: ROTATION_NONE,
        wall_alignment: WallAlignment::Auto,
    }
}

/// Full deterministic fallback analysis for `count` furniture items,
/// substituted when the vision call fails in place mode. The root
/// placement mirrors item 0 so single-item composition reads the same
/// rectangle either way.
pub fn fallback_analysis(count: usize) -> PlacementAnalysis {
    let items: Vec<_> = (0..count).map(|i| fallback_item(i, count)).collect();
    let first = items
        .first()
        .map(|i| i.placement)
        .unwrap_or_default();
    PlacementAnalysis {
        furniture_items: items,
        placement: PlacementSpec {
            rect: first,
            reasoning: Some("Deterministic layout (vision analysis unavailable)".to_string()),
            ..PlacementSpec::default()
        },
        ..PlacementAnalysis::default()
    }
}

/// Hardcoded default analysis used when the vision model responded but
/// its output could not be parsed as JSON: generic modern room, generic
/// furniture, centered 30% by 30% rectangle.
pub fn default_analysis() -> PlacementAnalysis {
    PlacementAnalysis {
        placement: PlacementSpec {
            rect: PlacementRectangle::centered(30.0, 30.0),
            reasoning: Some("Default placement".to_string()),
            ..PlacementSpec::default()
        },
        ..PlacementAnalysis::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
