//! Vision-analysis adapter: turns room and furniture photos into a
//! structured [`roomstage_core::analysis::PlacementAnalysis`].
//!
//! The external model is reached through the [`client::VisionClient`]
//! trait so the analyzer can be driven by fakes in tests. The adapter
//! degrades deterministically: unparseable model output becomes a
//! hardcoded default analysis, and the replace-mode room scan fails
//! soft to an empty item list.

pub mod analyzer;
pub mod client;
pub mod openai;
pub mod prompts;

pub use analyzer::{DetectedFurniture, PlacementAnalyzer};
pub use client::{VisionClient, VisionError};
pub use openai::OpenAiVisionClient;
