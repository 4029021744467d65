//! The placement analyzer: vision calls plus deterministic degradation.
//!
//! Three operations, three degradation contracts:
//! - single and multi placement parse the model's JSON and fall back to
//!   the hardcoded default analysis when parsing fails;
//! - the replace-mode room scan falls back to an empty item list on any
//!   failure, network included;
//! - maintenance conditions are retried a bounded number of times with
//!   a fixed delay before the error surfaces to the caller (which, in
//!   place mode, substitutes the deterministic fallback layout).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use roomstage_core::analysis::{default_analysis, PlacementAnalysis};
use roomstage_core::fenced_json::extract_json;
use roomstage_core::retry::RetryPolicy;

use crate::client::{VisionClient, VisionError};
use crate::prompts;

/// A furniture item the vision model asserts is clearly visible in the
/// room, with a free-text position description.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectedFurniture {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub position: String,
}

#[derive(Debug, Deserialize)]
struct ReplaceScanResponse {
    #[serde(default)]
    items: Vec<DetectedFurniture>,
}

/// Wraps a [`VisionClient`] with prompt selection, response parsing and
/// the retry policy for maintenance conditions.
pub struct PlacementAnalyzer {
    client: Arc<dyn VisionClient>,
    retry: RetryPolicy,
}

impl PlacementAnalyzer {
    pub fn new(client: Arc<dyn VisionClient>) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the maintenance retry policy (tests use a zero delay).
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Analyze a room and one furniture image.
    ///
    /// `manual_position` switches to the prompt that asks the model to
    /// size the furniture for a user-chosen spot instead of picking one.
    pub async fn analyze_placement(
        &self,
        room: &Path,
        furniture: &Path,
        manual_position: Option<(i64, i64)>,
    ) -> Result<PlacementAnalysis, VisionError> {
        let prompt = match manual_position {
            Some(pos) => prompts::manual_placement(pos),
            None => prompts::auto_placement(),
        };
        let images = vec![room.to_path_buf(), furniture.to_path_buf()];
        let text = self.call(&prompt, &images).await?;
        Ok(Self::parse_analysis(&text))
    }

    /// Analyze a room and 2 to 5 furniture images in one call, expecting
    /// a `furniture_items` entry per image.
    pub async fn analyze_multi_placement(
        &self,
        room: &Path,
        furniture: &[PathBuf],
    ) -> Result<PlacementAnalysis, VisionError> {
        let prompt = prompts::multi_placement(furniture.len());
        let mut images = Vec::with_capacity(furniture.len() + 1);
        images.push(room.to_path_buf());
        images.extend(furniture.iter().cloned());
        let text = self.call(&prompt, &images).await?;
        Ok(Self::parse_analysis(&text))
    }

    /// List furniture already visible in the room.
    ///
    /// Never fails: an unreachable backend or unparseable response both
    /// yield an empty list, which is also a valid model answer.
    pub async fn analyze_room_for_replace(&self, room: &Path) -> Vec<DetectedFurniture> {
        let prompt = prompts::replace_scan();
        let images = vec![room.to_path_buf()];
        let text = match self.call(&prompt, &images).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Replace-mode room scan failed, assuming no items");
                return Vec::new();
            }
        };

        extract_json(&text)
            .ok()
            .and_then(|v| serde_json::from_value::<ReplaceScanResponse>(v).ok())
            .map(|r| r.items)
            .unwrap_or_default()
    }

    /// One vision call with bounded retries on maintenance conditions.
    async fn call(
        &self,
        prompt: &prompts::VisionPrompt,
        images: &[PathBuf],
    ) -> Result<String, VisionError> {
        self.retry
            .run(
                || self.client.analyze(prompt, images),
                VisionError::is_retryable,
            )
            .await
    }

    /// Parse model output, degrading to the hardcoded default analysis
    /// when the text is not usable JSON.
    fn parse_analysis(text: &str) -> PlacementAnalysis {
        let value = match extract_json(text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Vision response is not JSON, using default analysis");
                return default_analysis();
            }
        };
        match serde_json::from_value::<PlacementAnalysis>(value) {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!(error = %e, "Vision JSON has unexpected shape, using default analysis");
                default_analysis()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
