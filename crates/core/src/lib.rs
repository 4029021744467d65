//! Domain types and pure placement logic for the roomstage service.
//!
//! Everything in this crate is side-effect free: geometry resolution,
//! the analysis payload model with its deterministic fallback layout,
//! collage layout math, free-text JSON extraction, aspect-ratio
//! snapping, the bounded retry policy and quota arithmetic. I/O lives
//! in the `vision`, `compose`, `db` and `api` crates.

pub mod analysis;
pub mod aspect;
pub mod error;
pub mod fenced_json;
pub mod geometry;
pub mod layout;
pub mod quota;
pub mod retry;

pub use error::CoreError;
