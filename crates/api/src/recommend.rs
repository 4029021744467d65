//! Catalog recommendations for a just-placed furniture item.
//!
//! Preferred path asks the text model to pick complementary items from
//! the catalog; any failure along that path (network, parse, no
//! matches) falls back to a keyword complement table instead of failing
//! the request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use roomstage_core::analysis::{FurnitureDescription, RoomAnalysis};
use roomstage_core::fenced_json::extract_json;
use roomstage_db::models::CatalogItem;
use roomstage_vision::prompts::VisionPrompt;
use roomstage_vision::VisionClient;

/// Cap on returned recommendations.
const MAX_RECOMMENDATIONS: usize = 4;
/// Cap for the keyword fallback.
const FALLBACK_COUNT: usize = 3;

/// Complementary item keywords per placed-furniture type.
const COMPLEMENTS: &[(&str, &[&str])] = &[
    ("sofa", &["armchair", "coffee table", "floor lamp", "cushion"]),
    ("bed", &["nightstand", "dresser", "lamp", "mirror"]),
    ("table", &["chair", "chandelier", "vase"]),
    ("armchair", &["floor lamp", "coffee table", "footrest"]),
    ("wardrobe", &["mirror", "pouf", "coat rack"]),
];

/// A catalog item with the reason it was suggested.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub reason: String,
    pub category: String,
}

#[derive(Debug, Deserialize)]
struct ModelRecommendation {
    item_name: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    category: String,
}

#[derive(Debug, Deserialize)]
struct ModelResponse {
    #[serde(default)]
    recommendations: Vec<ModelRecommendation>,
}

/// Recommendation service with model-driven matching and a keyword
/// fallback.
pub struct Recommender {
    client: Option<Arc<dyn VisionClient>>,
}

impl Recommender {
    /// `client` of `None` skips the model entirely and always uses the
    /// keyword fallback.
    pub fn new(client: Option<Arc<dyn VisionClient>>) -> Self {
        Self { client }
    }

    /// Recommend up to four catalog items that complement the placed
    /// furniture. Never fails; degrades to the keyword matcher.
    pub async fn recommend(
        &self,
        placed: &FurnitureDescription,
        room: &RoomAnalysis,
        catalog: &[CatalogItem],
    ) -> Vec<Recommendation> {
        if catalog.is_empty() {
            return Vec::new();
        }

        if let Some(client) = &self.client {
            let prompt = upsell_prompt(placed, room, catalog);
            match client.analyze(&prompt, &[]).await {
                Ok(text) => {
                    let matched = match_model_output(&text, catalog);
                    if !matched.is_empty() {
                        return matched;
                    }
                    tracing::warn!("Model recommendations matched nothing in the catalog");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Recommendation model call failed");
                }
            }
        }

        keyword_recommendations(&placed.item_type, catalog, FALLBACK_COUNT)
    }
}

/// Prompt asking the model to choose from the actual catalog.
fn upsell_prompt(
    placed: &FurnitureDescription,
    room: &RoomAnalysis,
    catalog: &[CatalogItem],
) -> VisionPrompt {
    let catalog_text: String = catalog
        .iter()
        .map(|item| {
            format!(
                "- {}: {} (style: {}, price: {})\n",
                item.name,
                item.description.as_deref().unwrap_or(""),
                item.style,
                item.price.map_or("N/A".to_string(), |p| p.to_string()),
            )
        })
        .collect();

    VisionPrompt {
        system: "You are an expert in furniture sales and interior design. \
                 Recommend additional items that match the style of the chosen \
                 furniture, complement the interior functionally and create a \
                 coherent composition. Be specific and convincing, not pushy."
            .to_string(),
        user: format!(
            "The client just placed a {item_type} in their room.\n\
             Chosen furniture: style {style}, color {color}.\n\
             Room: style {room_style}, lighting {lighting}.\n\n\
             Available catalog items:\n{catalog_text}\n\
             Recommend {MAX_RECOMMENDATIONS} items from the catalog and explain WHY \
             each fits (1-2 sentences).\n\n\
             Answer as JSON:\n\
             {{\n  \"recommendations\": [\n    {{\"item_name\": \"catalog item name\", \
             \"reason\": \"why it fits\", \"category\": \"functional / stylistic / accent\"}}\n  ]\n}}",
            item_type = placed.item_type,
            style = placed.style,
            color = placed.color,
            room_style = room.style,
            lighting = room.lighting,
        ),
    }
}

/// Parse model output and resolve each pick against the catalog by
/// case-insensitive substring match in either direction.
fn match_model_output(text: &str, catalog: &[CatalogItem]) -> Vec<Recommendation> {
    let Ok(value) = extract_json(text) else {
        return Vec::new();
    };
    let Ok(parsed) = serde_json::from_value::<ModelResponse>(value) else {
        return Vec::new();
    };

    let mut result = Vec::new();
    for rec in parsed.recommendations {
        let wanted = rec.item_name.to_lowercase();
        let found = catalog.iter().find(|item| {
            let name = item.name.to_lowercase();
            name.contains(&wanted) || wanted.contains(&name)
        });
        if let Some(item) = found {
            result.push(Recommendation {
                item: item.clone(),
                reason: rec.reason,
                category: rec.category,
            });
        }
        if result.len() >= MAX_RECOMMENDATIONS {
            break;
        }
    }
    result
}

/// Keyword fallback: items whose name or description mentions a known
/// complement of the placed type, padded with arbitrary catalog items
/// up to `count`.
fn keyword_recommendations(
    furniture_type: &str,
    catalog: &[CatalogItem],
    count: usize,
) -> Vec<Recommendation> {
    let type_lower = furniture_type.to_lowercase();
    let keywords: &[&str] = COMPLEMENTS
        .iter()
        .find(|(t, _)| type_lower.contains(t))
        .map_or(&[], |(_, kws)| *kws);

    let mut picked: Vec<&CatalogItem> = Vec::new();
    for item in catalog {
        let haystack = format!(
            "{} {}",
            item.name.to_lowercase(),
            item.description.as_deref().unwrap_or("").to_lowercase()
        );
        if keywords.iter().any(|kw| haystack.contains(kw)) {
            picked.push(item);
        }
        if picked.len() >= count {
            break;
        }
    }

    // Top up with whatever is left when keywords matched too little.
    for item in catalog {
        if picked.len() >= count {
            break;
        }
        if !picked.iter().any(|p| p.id == item.id) {
            picked.push(item);
        }
    }

    picked
        .into_iter()
        .map(|item| Recommendation {
            item: item.clone(),
            reason: format!("Pairs well with a {furniture_type}"),
            category: "complement".to_string(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, description: &str) -> CatalogItem {
        CatalogItem {
            id: name.to_string(),
            name: name.to_string(),
            item_type: "misc".to_string(),
            style: "modern".to_string(),
            image_path: String::new(),
            image_url: String::new(),
            description: Some(description.to_string()),
            price: None,
        }
    }

    #[test]
    fn keyword_fallback_prefers_complements() {
        let catalog = vec![
            item("Oak coffee table", "low table"),
            item("Velvet cushion set", "soft cushions"),
            item("Garden gnome", "decoration"),
        ];
        let recs = keyword_recommendations("sofa", &catalog, 2);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].item.name, "Oak coffee table");
        assert_eq!(recs[1].item.name, "Velvet cushion set");
    }

    #[test]
    fn keyword_fallback_pads_with_remaining_items() {
        let catalog = vec![item("Garden gnome", "decoration"), item("Rug", "wool rug")];
        let recs = keyword_recommendations("sofa", &catalog, 3);
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn unknown_type_still_recommends_something() {
        let catalog = vec![item("Rug", "wool rug")];
        let recs = keyword_recommendations("aquarium", &catalog, 3);
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn model_output_matches_by_substring() {
        let catalog = vec![item("Oak coffee table", ""), item("Floor lamp", "")];
        let text = r#"```json
        {"recommendations": [
            {"item_name": "coffee table", "reason": "matches the wood tones", "category": "stylistic"},
            {"item_name": "Something unknown", "reason": "x", "category": "y"}
        ]}
        ```"#;
        let recs = match_model_output(text, &catalog);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].item.name, "Oak coffee table");
        assert_eq!(recs[0].reason, "matches the wood tones");
    }

    #[test]
    fn unparseable_model_output_matches_nothing() {
        let catalog = vec![item("Rug", "")];
        assert!(match_model_output("no json at all", &catalog).is_empty());
    }

    #[tokio::test]
    async fn empty_catalog_short_circuits() {
        let recommender = Recommender::new(None);
        let recs = recommender
            .recommend(
                &FurnitureDescription::default(),
                &RoomAnalysis::default(),
                &[],
            )
            .await;
        assert!(recs.is_empty());
    }
}
