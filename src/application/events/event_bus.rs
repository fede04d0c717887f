//! Change feed: broadcasts document changes from the stores to listeners

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::domain::events::DocumentChange;

const DEFAULT_CAPACITY: usize = 1024;

/// What a feed subscriber observes next.
#[derive(Debug, Clone)]
pub enum FeedItem {
    Change(DocumentChange),
    /// The subscriber fell behind and `missed` changes were dropped.
    /// Anything derived from the feed must be rebuilt.
    Lagged(u64),
}

/// Broadcast bus carrying every successful store write
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DocumentChange>,
    subscriber_count: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            subscriber_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn publish(&self, change: DocumentChange) {
        let event_type = change.event_type();
        let collection = change.collection.as_str();
        let id = change.id.clone();

        match self.sender.send(change) {
            Ok(count) => {
                debug!(event_type, collection, id, subscribers = count, "Change published");
            }
            Err(_) => {
                debug!(event_type, collection, id, "Change published (no subscribers)");
            }
        }
    }

    pub fn subscribe(&self) -> EventSubscriber {
        let receiver = self.sender.subscribe();
        let count = self.subscriber_count.fetch_add(1, Ordering::SeqCst) + 1;
        info!(total = count, "New change-feed subscriber");

        EventSubscriber {
            receiver,
            subscriber_count: self.subscriber_count.clone(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of the change feed
pub struct EventSubscriber {
    receiver: broadcast::Receiver<DocumentChange>,
    subscriber_count: Arc<AtomicUsize>,
}

impl EventSubscriber {
    /// Wait for the next item. `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<FeedItem> {
        match self.receiver.recv().await {
            Ok(change) => Some(FeedItem::Change(change)),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "Change-feed subscriber lagged");
                Some(FeedItem::Lagged(missed))
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Take an already-queued item without waiting.
    pub fn try_recv(&mut self) -> Option<FeedItem> {
        match self.receiver.try_recv() {
            Ok(change) => Some(FeedItem::Change(change)),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                warn!(missed, "Change-feed subscriber lagged");
                Some(FeedItem::Lagged(missed))
            }
            Err(_) => None,
        }
    }
}

impl Drop for EventSubscriber {
    fn drop(&mut self) {
        let prev = self.subscriber_count.fetch_sub(1, Ordering::SeqCst);
        info!(remaining = prev.saturating_sub(1), "Change-feed subscriber dropped");
    }
}

/// Shared event bus type
pub type SharedEventBus = Arc<EventBus>;

/// Create a shared event bus
pub fn create_event_bus(capacity: usize) -> SharedEventBus {
    Arc::new(EventBus::with_capacity(capacity))
}
