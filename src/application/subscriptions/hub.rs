//! Subscription hub
//!
//! Live query fan-out. Listeners register a query and a callback; the hub
//! delivers an initial snapshot, then a fresh snapshot after every change
//! to the query's collection. Listeners with the same query share one
//! registry entry, so a change costs one store read per distinct query.
//!
//! Snapshots are tagged with the hub version current when their read
//! started. A listener never receives a snapshot older than one it has
//! already seen.

use std::collections::{BTreeSet, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::events::{EventBus, EventSubscriber, FeedItem};
use crate::application::repositories::decode;
use crate::domain::document::{Collection, Document, Query, SharedDocumentStore, StoredDocument};
use crate::domain::{DomainError, DomainResult};

type Callback = dyn Fn(&[StoredDocument]) + Send + Sync;

struct Listener {
    callback: Box<Callback>,
    active: AtomicBool,
    last_version: AtomicU64,
    /// Held across the version check and the callback so snapshots for
    /// one listener never overlap.
    delivery: Mutex<()>,
}

impl Listener {
    fn new(callback: Box<Callback>) -> Self {
        Self {
            callback,
            active: AtomicBool::new(true),
            last_version: AtomicU64::new(0),
            delivery: Mutex::new(()),
        }
    }

    /// Returns whether the snapshot was handed to the callback.
    fn deliver(&self, version: u64, docs: &[StoredDocument]) -> bool {
        let _serial = lock(&self.delivery);
        if !self.active.load(Ordering::SeqCst) {
            return false;
        }
        let seen = self.last_version.fetch_max(version, Ordering::SeqCst);
        if seen > version {
            debug!(version, seen, "Dropping stale snapshot");
            return false;
        }

        if catch_unwind(AssertUnwindSafe(|| (self.callback)(docs))).is_err() {
            error!("Subscription callback panicked");
            return false;
        }
        metrics::counter!("catalog_subscription_deliveries_total").increment(1);
        true
    }
}

struct Entry {
    query: Query,
    listeners: HashMap<u64, Arc<Listener>>,
}

/// Collections touched since the pump last woke up
#[derive(Default)]
struct ChangeBatch {
    collections: BTreeSet<Collection>,
    resync_all: bool,
    changes: usize,
}

impl ChangeBatch {
    fn add(&mut self, item: FeedItem) {
        match item {
            FeedItem::Change(change) => {
                self.collections.insert(change.collection);
                self.changes += 1;
            }
            FeedItem::Lagged(missed) => {
                warn!(missed, "Change feed lagged; refreshing every live query");
                self.resync_all = true;
            }
        }
    }

    fn touches(&self, collection: Collection) -> bool {
        self.resync_all || self.collections.contains(&collection)
    }
}

pub struct SubscriptionHub {
    store: SharedDocumentStore,
    registry: Mutex<HashMap<String, Entry>>,
    next_listener_id: AtomicU64,
    version: AtomicU64,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl SubscriptionHub {
    /// Create the hub and start following `event_bus`. Must be called
    /// inside a tokio runtime.
    pub fn start(store: SharedDocumentStore, event_bus: &EventBus) -> Arc<Self> {
        let hub = Arc::new(Self {
            store,
            registry: Mutex::new(HashMap::new()),
            next_listener_id: AtomicU64::new(1),
            version: AtomicU64::new(0),
            pump: Mutex::new(None),
        });

        let feed = event_bus.subscribe();
        let handle = tokio::spawn(pump(Arc::downgrade(&hub), feed));
        *lock(&hub.pump) = Some(handle);
        info!("Subscription hub started");
        hub
    }

    /// Register a live query. The initial snapshot is delivered before this
    /// returns; later snapshots arrive from the hub's background task.
    ///
    /// Documents that fail to decode as `T` are left out of the snapshot.
    pub async fn subscribe<T, F>(self: &Arc<Self>, query: Query, on_change: F) -> DomainResult<Subscription>
    where
        T: Document,
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        if query.collection != T::COLLECTION {
            return Err(DomainError::Validation(format!(
                "Cannot subscribe to {} as {} records",
                query.collection,
                T::ENTITY
            )));
        }

        let callback = move |docs: &[StoredDocument]| on_change(decode_all::<T>(docs));
        self.subscribe_raw(query, Box::new(callback)).await
    }

    async fn subscribe_raw(self: &Arc<Self>, query: Query, callback: Box<Callback>) -> DomainResult<Subscription> {
        let listener = Arc::new(Listener::new(callback));
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        let key = query.signature();
        let version = self.version.load(Ordering::SeqCst);

        // registered before the first read so no change can slip between them
        {
            let mut registry = lock(&self.registry);
            registry
                .entry(key.clone())
                .or_insert_with(|| Entry {
                    query: query.clone(),
                    listeners: HashMap::new(),
                })
                .listeners
                .insert(id, listener.clone());
        }
        self.report_active();
        debug!(listener_id = id, query = %key, "Subscription registered");

        let page = match self.store.query(&query).await {
            Ok(page) => page,
            Err(e) => {
                self.remove(&key, id);
                return Err(e);
            }
        };
        listener.deliver(version, &page.items);

        Ok(Subscription {
            hub: Arc::downgrade(self),
            key,
            id,
            listener,
        })
    }

    /// Number of live listeners across all queries.
    pub fn active_subscriptions(&self) -> usize {
        lock(&self.registry).values().map(|e| e.listeners.len()).sum()
    }

    /// Number of distinct live queries.
    pub fn live_queries(&self) -> usize {
        lock(&self.registry).len()
    }

    fn remove(&self, key: &str, id: u64) {
        {
            let mut registry = lock(&self.registry);
            if let Some(entry) = registry.get_mut(key) {
                entry.listeners.remove(&id);
                if entry.listeners.is_empty() {
                    registry.remove(key);
                }
            }
        }
        self.report_active();
        debug!(listener_id = id, query = key, "Subscription removed");
    }

    fn report_active(&self) {
        metrics::gauge!("catalog_active_subscriptions").set(self.active_subscriptions() as f64);
    }

    async fn refresh(&self, batch: ChangeBatch) {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;

        // snapshot the registry; the lock is never held across a store read
        let targets: Vec<(Query, Vec<Arc<Listener>>)> = lock(&self.registry)
            .values()
            .filter(|entry| batch.touches(entry.query.collection))
            .map(|entry| (entry.query.clone(), entry.listeners.values().cloned().collect()))
            .collect();
        if targets.is_empty() {
            return;
        }

        debug!(
            version,
            changes = batch.changes,
            queries = targets.len(),
            "Refreshing live queries"
        );
        for (query, listeners) in targets {
            match self.store.query(&query).await {
                Ok(page) => {
                    for listener in &listeners {
                        listener.deliver(version, &page.items);
                    }
                }
                Err(e) => {
                    warn!(query = %query.signature(), error = %e, "Live query refresh failed");
                }
            }
        }
    }
}

impl Drop for SubscriptionHub {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.pump).take() {
            handle.abort();
        }
        info!("Subscription hub stopped");
    }
}

async fn pump(hub: Weak<SubscriptionHub>, mut feed: EventSubscriber) {
    while let Some(first) = feed.recv().await {
        let mut batch = ChangeBatch::default();
        batch.add(first);
        while let Some(item) = feed.try_recv() {
            batch.add(item);
        }

        let Some(live) = hub.upgrade() else {
            break;
        };
        live.refresh(batch).await;
    }
    debug!("Subscription pump finished");
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn decode_all<T: Document>(docs: &[StoredDocument]) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match decode::<T>(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable document in live query");
                None
            }
        })
        .collect()
}

/// Handle for one live query listener. Dropping it unsubscribes.
pub struct Subscription {
    hub: Weak<SubscriptionHub>,
    key: String,
    id: u64,
    listener: Arc<Listener>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop receiving snapshots. No callback runs after this returns,
    /// other than one already in progress.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.listener.active.store(false, Ordering::SeqCst);
        if let Some(hub) = self.hub.upgrade() {
            hub.remove(&self.key, self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("query", &self.key)
            .finish()
    }
}
