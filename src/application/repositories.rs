//! Typed repositories over the document store
//!
//! Records are closed serde types; anything a store hands back that does
//! not decode into its record type is reported as `CorruptDocument`
//! instead of being coerced.

use std::marker::PhantomData;

use crate::domain::document::{Document, Query, SharedDocumentStore, StoredDocument};
use crate::domain::{
    BaseService, DomainError, DomainResult, ProfessionalProfile, ProfessionalService,
    ServiceCategory, ServiceProviderAggregate,
};

pub fn decode<T: Document>(doc: &StoredDocument) -> DomainResult<T> {
    serde_json::from_value(doc.body.clone()).map_err(|e| DomainError::CorruptDocument {
        collection: T::COLLECTION.as_str(),
        id: doc.id.clone(),
        reason: e.to_string(),
    })
}

/// One page of typed results
#[derive(Debug, Clone)]
pub struct TypedPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

pub struct DocumentRepository<T: Document> {
    store: SharedDocumentStore,
    _record: PhantomData<fn() -> T>,
}

impl<T: Document> Clone for DocumentRepository<T> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<T: Document> DocumentRepository<T> {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Empty query over this repository's collection
    pub fn query(&self) -> Query {
        Query::collection(T::COLLECTION)
    }

    pub async fn find_by_id(&self, id: &str) -> DomainResult<Option<T>> {
        self.store
            .get(T::COLLECTION, id)
            .await?
            .map(|doc| decode(&doc))
            .transpose()
    }

    /// Like `find_by_id`, but a missing record is `NotFound`.
    pub async fn get(&self, id: &str) -> DomainResult<T> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(T::ENTITY, id))
    }

    pub async fn save(&self, record: &T) -> DomainResult<()> {
        let body = serde_json::to_value(record).map_err(|e| DomainError::CorruptDocument {
            collection: T::COLLECTION.as_str(),
            id: record.id().to_string(),
            reason: e.to_string(),
        })?;
        self.store.put(T::COLLECTION, record.id(), body).await
    }

    pub async fn delete(&self, id: &str) -> DomainResult<bool> {
        self.store.delete(T::COLLECTION, id).await
    }

    pub async fn find_page(&self, query: &Query) -> DomainResult<TypedPage<T>> {
        if query.collection != T::COLLECTION {
            return Err(DomainError::Validation(format!(
                "Query targets {} but {} records live in {}",
                query.collection,
                T::ENTITY,
                T::COLLECTION
            )));
        }
        let page = self.store.query(query).await?;
        let items = page.items.iter().map(decode).collect::<DomainResult<Vec<T>>>()?;
        Ok(TypedPage {
            items,
            next_cursor: page.next_cursor,
        })
    }

    pub async fn find(&self, query: &Query) -> DomainResult<Vec<T>> {
        Ok(self.find_page(query).await?.items)
    }
}

/// Per-collection repositories sharing one store
#[derive(Clone)]
pub struct Repositories {
    pub categories: DocumentRepository<ServiceCategory>,
    pub base_services: DocumentRepository<BaseService>,
    pub offerings: DocumentRepository<ProfessionalService>,
    pub providers: DocumentRepository<ServiceProviderAggregate>,
    pub professionals: DocumentRepository<ProfessionalProfile>,
}

impl Repositories {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            categories: DocumentRepository::new(store.clone()),
            base_services: DocumentRepository::new(store.clone()),
            offerings: DocumentRepository::new(store.clone()),
            providers: DocumentRepository::new(store.clone()),
            professionals: DocumentRepository::new(store),
        }
    }
}
