//! The placement engine: one straight-line pipeline per generation
//! request.

pub mod dispatcher;

pub use dispatcher::{GenerateParams, GenerationResult, PlacementEngine};
