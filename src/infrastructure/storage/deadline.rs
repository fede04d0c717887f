//! Deadline decorator for any document store

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::document::{Collection, DocumentStore, Page, Query, StoredDocument};
use crate::domain::DomainResult;
use crate::shared::with_deadline;

/// Applies one deadline to every call of the wrapped store.
pub struct DeadlineStore {
    inner: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl DeadlineStore {
    pub fn new(inner: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl DocumentStore for DeadlineStore {
    async fn get(&self, collection: Collection, id: &str) -> DomainResult<Option<StoredDocument>> {
        with_deadline(self.timeout, "get", self.inner.get(collection, id)).await
    }

    async fn query(&self, query: &Query) -> DomainResult<Page> {
        with_deadline(self.timeout, "query", self.inner.query(query)).await
    }

    async fn put(&self, collection: Collection, id: &str, body: Value) -> DomainResult<()> {
        with_deadline(self.timeout, "put", self.inner.put(collection, id, body)).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> DomainResult<bool> {
        with_deadline(self.timeout, "delete", self.inner.delete(collection, id)).await
    }
}
