//! Request handlers, one module per resource.

pub mod catalog;
pub mod generate;
pub mod health;
pub mod recommendations;
pub mod uploads;
pub mod visits;
