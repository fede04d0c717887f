pub mod catalog;
pub mod events;
pub mod repositories;
pub mod services;
pub mod subscriptions;

// Re-export key types for convenience
pub use catalog::Catalog;
pub use events::{create_event_bus, EventBus, EventSubscriber, FeedItem, SharedEventBus};
pub use repositories::{DocumentRepository, Repositories};
pub use services::{
    BaseServiceCatalog, BaseServiceFilter, CategoryRegistry, Discovery,
    DocumentProfessionalDirectory, OfferingStore, ProviderProjector,
};
pub use subscriptions::{Subscription, SubscriptionHub};
