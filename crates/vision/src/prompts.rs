//! Prompt templates for the vision model.
//!
//! Every template demands strict JSON so the response survives
//! [`roomstage_core::fenced_json::extract_json`]. The placement schema
//! uses percent coordinates relative to the room image throughout.

/// System plus user message for one vision call.
#[derive(Debug, Clone)]
pub struct VisionPrompt {
    pub system: String,
    pub user: String,
}

const PLACEMENT_SCHEMA: &str = r#"{
  "room_analysis": {
    "size_estimate": "approximate size in meters",
    "lighting": "description of the lighting",
    "style": "interior style",
    "perspective": "camera perspective",
    "free_spaces": ["list of free areas"]
  },
  "furniture_analysis": {
    "type": "furniture type (sofa, armchair, table...)",
    "estimated_size": "approximate size in meters",
    "style": "detailed style description",
    "color": "EXACT color with shade (e.g. 'deep purple', 'burgundy')",
    "features": ["visual details: armrest shape, upholstery, cushions, leg shape"]
  },
  "placement": {
    "x_percent": 50,
    "y_percent": 60,
    "width_percent": 35,
    "height_percent": 25,
    "reasoning": "why this is the best spot"
  }
}"#;

/// Prompt for automatic single-item placement: the model picks the spot.
pub fn auto_placement() -> VisionPrompt {
    VisionPrompt {
        system: "You are an expert in interior design and 3D composition. \
                 Analyze a photo of a room and a photo of a furniture item and find \
                 the BEST spot for the furniture.\n\
                 The room and the furniture must remain COMPLETELY unchanged. \
                 Describe the furniture as precisely as possible: exact color, exact \
                 shape, exact details. You only pick the area where the furniture is \
                 inserted. Account for perspective, lighting and proportions.\n\
                 Return the answer STRICTLY as JSON."
            .to_string(),
        user: format!(
            "Analyze these images:\n\
             1. The first image is the room\n\
             2. The second image is the furniture\n\n\
             Determine the room's characteristics, the furniture's characteristics \
             (be maximally precise about color and visual details), and the best \
             placement area.\n\n\
             Return JSON:\n{PLACEMENT_SCHEMA}\n\n\
             Coordinates are percentages of the room image dimensions."
        ),
    }
}

/// Prompt for single-item placement at a user-chosen pixel position.
pub fn manual_placement(position: (i64, i64)) -> VisionPrompt {
    let (x, y) = position;
    VisionPrompt {
        system: "You are an expert in interior design. The user picked the exact \
                 spot where the furniture should go; your job is to determine the \
                 right size and parameters for that spot. Do NOT change any detail \
                 of the room. Return the answer STRICTLY as JSON."
            .to_string(),
        user: format!(
            "The user wants the furniture placed at pixel position ({x}, {y}) of \
             the room image.\n\n\
             Check whether the spot suits this furniture, what size the furniture \
             should have there, and at what angle it should stand.\n\n\
             Images:\n1. The first image is the room\n2. The second image is the \
             furniture\n\n\
             Return JSON with this schema, using the given position:\n{PLACEMENT_SCHEMA}"
        ),
    }
}

/// Prompt for multi-item placement: one call covering all furniture
/// images, returning one `furniture_items` entry per image.
pub fn multi_placement(item_count: usize) -> VisionPrompt {
    VisionPrompt {
        system: "You are an expert in interior design and 3D composition. \
                 Analyze a photo of a room and several furniture photos, then plan \
                 a coherent arrangement that places EVERY item into the room. \
                 The room and the furniture must remain completely unchanged. \
                 Return the answer STRICTLY as JSON."
            .to_string(),
        user: format!(
            "Analyze these images:\n\
             1. The first image is the room\n\
             2. The following {item_count} images are furniture items, in order\n\n\
             Return JSON:\n\
             {{\n\
               \"room_analysis\": {{\"style\": \"...\", \"lighting\": \"...\"}},\n\
               \"furniture_items\": [\n\
                 {{\n\
                   \"index\": 0,\n\
                   \"type\": \"furniture type\",\n\
                   \"color\": \"exact color\",\n\
                   \"style\": \"style\",\n\
                   \"placement\": {{\"x_percent\": 30, \"y_percent\": 60, \
                      \"width_percent\": 25, \"height_percent\": 20}}\n\
                 }}\n\
               ],\n\
               \"overall_composition\": \"one sentence about the arrangement\"\n\
             }}\n\n\
             Provide exactly one furniture_items entry per furniture image \
             (index 0 to {last}), with non-overlapping placement areas. \
             Coordinates are percentages of the room image dimensions.",
            last = item_count.saturating_sub(1),
        ),
    }
}

/// Prompt for the replace-mode room scan: list furniture already in the
/// room so the caller can describe what to swap out.
pub fn replace_scan() -> VisionPrompt {
    VisionPrompt {
        system: "You are an expert in interior analysis. List the furniture items \
                 that are CLEARLY visible in the room photo. Only include items you \
                 are confident about; an empty list is a valid answer. Return the \
                 answer STRICTLY as JSON."
            .to_string(),
        user: "Analyze the room photo and return JSON:\n\
               {\n\
                 \"items\": [\n\
                   {\"type\": \"sofa\", \"position\": \"along the left wall\"}\n\
                 ]\n\
               }"
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_prompt_embeds_position() {
        let p = manual_placement((320, 480));
        assert!(p.user.contains("(320, 480)"));
    }

    #[test]
    fn multi_prompt_names_item_count_and_last_index() {
        let p = multi_placement(4);
        assert!(p.user.contains("4 images are furniture"));
        assert!(p.user.contains("index 0 to 3"));
    }
}
