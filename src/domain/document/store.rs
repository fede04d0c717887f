//! Document store port

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::collection::Collection;
use super::query::{Page, Query, StoredDocument};
use crate::shared::errors::DomainResult;

/// Generic read/write primitives over document collections.
///
/// `put` and `delete` are atomic per document; nothing spans documents.
/// Implementations publish a change on the event bus after each
/// successful write.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, id: &str) -> DomainResult<Option<StoredDocument>>;
    async fn query(&self, query: &Query) -> DomainResult<Page>;
    /// Insert or overwrite. Overwrites keep the original insertion order.
    async fn put(&self, collection: Collection, id: &str, body: Value) -> DomainResult<()>;
    /// Returns whether a document was removed.
    async fn delete(&self, collection: Collection, id: &str) -> DomainResult<bool>;
}

pub type SharedDocumentStore = Arc<dyn DocumentStore>;

/// A typed record persisted in exactly one collection.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;
    /// Entity name used in error messages
    const ENTITY: &'static str;

    fn id(&self) -> &str;
}
