//! Generation prompts.
//!
//! The generative provider has no structured geometry input; these
//! strings are the only channel carrying the resolved placement, so
//! they spell out percent coordinates, rotation and wall alignment
//! explicitly.

use roomstage_core::analysis::PlacementAnalysis;
use roomstage_core::geometry::{WallAlignment, ROTATION_QUARTER};
use roomstage_core::layout::describe_placements;

/// Prompt for inserting a single furniture item into the room.
pub fn single_placement(analysis: &PlacementAnalysis) -> String {
    let furniture = &analysis.furniture_analysis;
    let room = &analysis.room_analysis;
    let placement = &analysis.placement;
    let rect = placement.rect;

    let placement_hint = format!(
        "Place the furniture centered at approximately {:.1}% from the left and \
         {:.1}% from the top. Fit it inside a rectangle of about {:.1}% width and \
         {:.1}% height of the room image.",
        rect.x_percent, rect.y_percent, rect.width_percent, rect.height_percent,
    );

    let rotation_hint = if placement.rotation == ROTATION_QUARTER {
        "\nThe furniture is rotated 90 degrees to match the user's requested \
         orientation (vertical vs horizontal)."
    } else {
        ""
    };

    let wall_hint = match placement.wall_alignment {
        WallAlignment::Left | WallAlignment::Right | WallAlignment::Back => format!(
            "\nIMPORTANT: Place the furniture ALONG the {} wall, parallel to it, and \
             flush against it. Do NOT place it perpendicular across the room.",
            placement.wall_alignment,
        ),
        WallAlignment::Auto => String::new(),
    };

    let reasoning = placement
        .reasoning
        .as_deref()
        .map(|r| format!("\nContext: {r}"))
        .unwrap_or_default();

    format!(
        "Seamlessly integrate the exact {color} {item_type} from the second image \
         into the {room_style} room from the first image.\n\n\
         CRITICAL: Preserve the EXACT appearance of the furniture - same color, \
         texture, and design.\n\n\
         Placement: {placement_hint}{reasoning}{rotation_hint}{wall_hint}\n\n\
         Requirements:\n\
         - Match the room's {lighting}\n\
         - Add realistic shadows and reflections\n\
         - Adjust perspective to fit naturally\n\
         - Maintain photorealistic quality\n\
         - Keep furniture IDENTICAL to the original image\n\
         - Blend seamlessly with the interior\n\
         - CRITICAL: Place furniture ON THE FLOOR, standing normally. Do NOT put it \
         on the wall or vertically. Beds horizontal on the floor, chairs and sofas \
         upright with legs on the ground.\n\n\
         Output in high resolution with sharp details.",
        color = furniture.color,
        item_type = furniture.item_type,
        room_style = room.style,
        lighting = room.lighting,
    )
}

/// Prompt for one call that places every item from the collage.
///
/// The clause list is positional ground truth: clause `i` describes the
/// item at slot `i` of the left-to-right reference row.
pub fn multi_placement(analysis: &PlacementAnalysis, item_count: usize) -> String {
    let room = &analysis.room_analysis;
    let placement_text = describe_placements(analysis, item_count);

    format!(
        "The first image is the room. The second image is a reference sheet with \
         {item_count} furniture items arranged in a row from LEFT to RIGHT \
         (item 1 = leftmost, item {item_count} = rightmost).\n\n\
         Place each item from the second image into the {room_style} room at these \
         positions:\n{placement_text}\n\n\
         CRITICAL: Preserve the EXACT appearance of every furniture item - same \
         colors, textures, and design. Integrate ALL items into the room in one \
         coherent scene.\n\
         CRITICAL: Place ALL furniture ON THE FLOOR, standing normally. Do NOT put \
         furniture on walls or vertically against the wall. Beds must be horizontal \
         on the floor, chairs and sofas upright on the floor with legs on the \
         ground.\n\
         Match the room's {lighting}. Add realistic shadows and reflections. \
         Maintain photorealistic quality. Output in high resolution with sharp \
         details.",
        room_style = room.style,
        lighting = room.lighting,
    )
}

/// Prompt for swapping existing furniture for the new item(s).
pub fn replace(hint: Option<&str>) -> String {
    let what_line = hint
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(|h| format!(" The furniture to replace in the room is: {h}.\n\n"))
        .unwrap_or_default();

    format!(
        "The first image is a room with existing furniture. The second image shows \
         the NEW furniture that should replace the corresponding old item.{what_line}\n\
         TASK: REPLACE the existing furniture in the room with the new furniture \
         from the second image.\n\
         - Remove the old furniture completely.\n\
         - Place the new furniture in the SAME location and position where the old \
         one was.\n\
         - Keep the rest of the room unchanged: walls, floor, other objects, \
         lighting.\n\
         - Preserve the EXACT appearance of the new furniture (same color, texture, \
         design).\n\
         - Match the room's lighting and add realistic shadows. The result must \
         look photorealistic.\n\
         - The new furniture must stand ON THE FLOOR in a natural orientation, not \
         on the wall."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomstage_core::analysis::fallback_analysis;

    #[test]
    fn single_prompt_carries_geometry_and_wall_hint() {
        let mut analysis = fallback_analysis(1);
        analysis.placement.wall_alignment = WallAlignment::Left;
        analysis.placement.rotation = 90;

        let prompt = single_placement(&analysis);
        assert!(prompt.contains("25.0% from the left"));
        assert!(prompt.contains("ALONG the left wall"));
        assert!(prompt.contains("rotated 90 degrees"));
    }

    #[test]
    fn auto_alignment_omits_wall_hint() {
        let analysis = fallback_analysis(1);
        let prompt = single_placement(&analysis);
        assert!(!prompt.contains("ALONG the"));
        assert!(!prompt.contains("rotated 90 degrees"));
    }

    #[test]
    fn multi_prompt_has_one_clause_per_item() {
        let analysis = fallback_analysis(3);
        let prompt = multi_placement(&analysis, 3);
        assert!(prompt.contains("Item 1"));
        assert!(prompt.contains("Item 3"));
        assert!(prompt.contains("LEFT to RIGHT"));
    }

    #[test]
    fn replace_prompt_passes_hint_verbatim() {
        let prompt = replace(Some("sofa on the left"));
        assert!(prompt.contains("The furniture to replace in the room is: sofa on the left."));

        let bare = replace(None);
        assert!(!bare.contains("The furniture to replace in the room is"));
    }
}
