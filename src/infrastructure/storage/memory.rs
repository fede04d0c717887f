//! In-memory document store for development and testing

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use crate::application::events::SharedEventBus;
use crate::domain::document::{Collection, DocumentStore, Page, Query, StoredDocument};
use crate::domain::events::DocumentChange;
use crate::domain::DomainResult;

pub struct InMemoryDocumentStore {
    collections: HashMap<Collection, DashMap<String, StoredDocument>>,
    seq_counter: AtomicU64,
    event_bus: SharedEventBus,
}

impl InMemoryDocumentStore {
    pub fn new(event_bus: SharedEventBus) -> Self {
        Self {
            collections: Collection::ALL
                .into_iter()
                .map(|c| (c, DashMap::new()))
                .collect(),
            seq_counter: AtomicU64::new(1),
            event_bus,
        }
    }

    fn docs(&self, collection: Collection) -> &DashMap<String, StoredDocument> {
        // every collection is created up front
        &self.collections[&collection]
    }

    /// Number of documents currently held in `collection`
    pub fn len(&self, collection: Collection) -> usize {
        self.docs(collection).len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> DomainResult<Option<StoredDocument>> {
        Ok(self.docs(collection).get(id).map(|d| d.clone()))
    }

    async fn query(&self, query: &Query) -> DomainResult<Page> {
        let docs: Vec<StoredDocument> = self
            .docs(query.collection)
            .iter()
            .map(|e| e.value().clone())
            .collect();
        query.execute(docs)
    }

    async fn put(&self, collection: Collection, id: &str, body: Value) -> DomainResult<()> {
        match self.docs(collection).entry(id.to_string()) {
            Entry::Occupied(mut existing) => {
                existing.get_mut().body = body;
            }
            Entry::Vacant(slot) => {
                slot.insert(StoredDocument {
                    id: id.to_string(),
                    seq: self.seq_counter.fetch_add(1, Ordering::SeqCst),
                    body,
                });
            }
        }
        debug!(collection = collection.as_str(), id, "Document stored");
        self.event_bus.publish(DocumentChange::put(collection, id));
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> DomainResult<bool> {
        let removed = self.docs(collection).remove(id).is_some();
        if removed {
            debug!(collection = collection.as_str(), id, "Document deleted");
            self.event_bus.publish(DocumentChange::delete(collection, id));
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::{create_event_bus, FeedItem};
    use crate::domain::document::OrderBy;
    use crate::domain::events::ChangeKind;
    use serde_json::json;

    fn store() -> (InMemoryDocumentStore, SharedEventBus) {
        let bus = create_event_bus(16);
        (InMemoryDocumentStore::new(bus.clone()), bus)
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let (store, _bus) = store();
        store
            .put(Collection::Categories, "c1", json!({"name": "Hair"}))
            .await
            .unwrap();

        let doc = store.get(Collection::Categories, "c1").await.unwrap().unwrap();
        assert_eq!(doc.body["name"], "Hair");
        assert!(store.get(Collection::BaseServices, "c1").await.unwrap().is_none());

        assert!(store.delete(Collection::Categories, "c1").await.unwrap());
        assert!(!store.delete(Collection::Categories, "c1").await.unwrap());
        assert_eq!(store.len(Collection::Categories), 0);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_insertion_position() {
        let (store, _bus) = store();
        for (id, price) in [("a", 10), ("b", 10), ("c", 10)] {
            store
                .put(Collection::ProfessionalServices, id, json!({"price": price}))
                .await
                .unwrap();
        }
        store
            .put(Collection::ProfessionalServices, "a", json!({"price": 10, "touched": true}))
            .await
            .unwrap();

        let page = store
            .query(&Query::collection(Collection::ProfessionalServices).order_by(OrderBy::asc("price")))
            .await
            .unwrap();
        let ids: Vec<&str> = page.items.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(page.items[0].body["touched"], true);
    }

    #[tokio::test]
    async fn test_writes_publish_changes() {
        let (store, bus) = store();
        let mut feed = bus.subscribe();

        store.put(Collection::ServiceProviders, "p_s", json!({})).await.unwrap();
        store.delete(Collection::ServiceProviders, "p_s").await.unwrap();
        // deleting a missing document publishes nothing
        store.delete(Collection::ServiceProviders, "p_s").await.unwrap();

        let kinds: Vec<ChangeKind> = std::iter::from_fn(|| feed.try_recv())
            .map(|item| match item {
                FeedItem::Change(c) => c.kind,
                FeedItem::Lagged(_) => panic!("unexpected lag"),
            })
            .collect();
        assert_eq!(kinds, vec![ChangeKind::Put, ChangeKind::Delete]);
    }
}
