pub mod base_service;
pub mod category;
pub mod document;
pub mod events;
pub mod offering;
pub mod professional;
pub mod provider;

// Re-export commonly used types
pub use base_service::{BaseService, BaseServicePatch, NewBaseService};
pub use category::{CategoryPatch, NewCategory, ServiceCategory};
pub use document::{Collection, Document, DocumentStore, Query, SharedDocumentStore};
pub use events::{ChangeKind, DocumentChange};
pub use offering::{
    validate_offering, OfferingFilter, OfferingOrder, OfferingPatch, OfferingSortField,
    ProfessionalService,
};
pub use professional::{ProfessionalDirectory, ProfessionalDisplayInfo, ProfessionalProfile};
pub use provider::{CategoryDisplayInfo, ServiceProviderAggregate};

pub use crate::shared::errors::{DomainError, DomainResult};
