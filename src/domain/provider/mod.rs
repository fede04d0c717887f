//! Service provider discovery aggregate

pub mod model;

pub use model::{fields, CategoryDisplayInfo, ServiceProviderAggregate};
