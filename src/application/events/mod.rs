//! Change feed (pub/sub)
//!
//! Change types are defined in `domain::events`. The `EventBus`
//! implementation (broadcast channel) lives here in the application layer.

pub mod event_bus;

pub use crate::domain::events::{ChangeKind, DocumentChange};

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, FeedItem, SharedEventBus};
