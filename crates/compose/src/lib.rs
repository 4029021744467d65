//! Composition backends: everything that turns a resolved
//! [`roomstage_core::analysis::PlacementAnalysis`] plus image files
//! into a result image.
//!
//! Two backend families implement the [`backend::ComposeBackend`]
//! contract: a local alpha-compositing backend that keeps furniture
//! pixels untouched, and a generative backend that drives an external
//! submit/poll image-generation provider (single reference image for
//! one item, a side-by-side collage for several, and a swap flow for
//! replace mode).

pub mod backend;
pub mod collage;
pub mod generative;
pub mod hosting;
pub mod pixel;
pub mod prompts;
pub mod resize;
pub mod task;

pub use backend::{ComposeBackend, ComposeError, ComposeRequest, CompositionMode};
pub use generative::GenerativeBackend;
pub use hosting::ImageHost;
pub use pixel::PixelCompositeBackend;
pub use task::{GenerationApi, GenerationTask, KieGenerationApi, PollConfig, TaskPoll};
