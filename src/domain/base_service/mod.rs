//! Base service aggregate

pub mod model;

pub use model::{fields, BaseService, BaseServicePatch, NewBaseService, MIN_BASE_DURATION};
