//! Row types for the roomstage stores.

pub mod catalog;
pub mod trial;
pub mod visit;

pub use catalog::{CatalogItem, CreateCatalogItem};
pub use trial::TrialUsage;
pub use visit::{CreateVisit, Visit};
