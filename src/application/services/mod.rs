//! Application services

mod base_service_catalog;
mod category_registry;
pub mod discovery;
mod offering_store;
mod professionals;
mod projector;

pub use base_service_catalog::{BaseServiceCatalog, BaseServiceFilter};
pub use category_registry::CategoryRegistry;
pub use discovery::Discovery;
pub use offering_store::OfferingStore;
pub use professionals::DocumentProfessionalDirectory;
pub use projector::ProviderProjector;
