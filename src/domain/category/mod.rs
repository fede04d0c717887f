//! Service category aggregate

pub mod model;

pub use model::{fields, CategoryPatch, NewCategory, ServiceCategory};
