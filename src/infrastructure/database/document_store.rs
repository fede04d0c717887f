//! SeaORM implementation of DocumentStore
//!
//! Documents are kept as JSON text, one row each. Filtering and ordering
//! run in process through `Query::execute`, after narrowing to the
//! collection in SQL.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::Value;
use tracing::debug;

use super::entities::document;
use crate::application::events::SharedEventBus;
use crate::domain::document::{Collection, DocumentStore, Page, Query, StoredDocument};
use crate::domain::events::DocumentChange;
use crate::domain::{DomainError, DomainResult};
use crate::shared::errors::InfraError;

pub struct SeaOrmDocumentStore {
    db: DatabaseConnection,
    event_bus: SharedEventBus,
}

impl SeaOrmDocumentStore {
    pub fn new(db: DatabaseConnection, event_bus: SharedEventBus) -> Self {
        Self { db, event_bus }
    }

    /// Get database connection reference
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn row_to_document(collection: Collection, row: document::Model) -> DomainResult<StoredDocument> {
    let body: Value = serde_json::from_str(&row.body).map_err(|e| DomainError::CorruptDocument {
        collection: collection.as_str(),
        id: row.doc_id.clone(),
        reason: e.to_string(),
    })?;
    Ok(StoredDocument {
        id: row.doc_id,
        seq: row.seq as u64,
        body,
    })
}

#[async_trait]
impl DocumentStore for SeaOrmDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> DomainResult<Option<StoredDocument>> {
        let row = document::Entity::find()
            .filter(document::Column::Collection.eq(collection.as_str()))
            .filter(document::Column::DocId.eq(id))
            .one(&self.db)
            .await?;
        row.map(|r| row_to_document(collection, r)).transpose()
    }

    async fn query(&self, query: &Query) -> DomainResult<Page> {
        let rows = document::Entity::find()
            .filter(document::Column::Collection.eq(query.collection.as_str()))
            .order_by_asc(document::Column::Seq)
            .all(&self.db)
            .await?;
        let docs = rows
            .into_iter()
            .map(|r| row_to_document(query.collection, r))
            .collect::<DomainResult<Vec<_>>>()?;
        query.execute(docs)
    }

    async fn put(&self, collection: Collection, id: &str, body: Value) -> DomainResult<()> {
        let body = serde_json::to_string(&body).map_err(InfraError::from)?;
        let row = document::ActiveModel {
            collection: Set(collection.as_str().to_string()),
            doc_id: Set(id.to_string()),
            body: Set(body),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        // overwrite in place so the row keeps its seq
        document::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([document::Column::Collection, document::Column::DocId])
                    .update_columns([document::Column::Body, document::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        debug!(collection = collection.as_str(), id, "Document stored");
        self.event_bus.publish(DocumentChange::put(collection, id));
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> DomainResult<bool> {
        let result = document::Entity::delete_many()
            .filter(document::Column::Collection.eq(collection.as_str()))
            .filter(document::Column::DocId.eq(id))
            .exec(&self.db)
            .await?;

        let removed = result.rows_affected > 0;
        if removed {
            debug!(collection = collection.as_str(), id, "Document deleted");
            self.event_bus.publish(DocumentChange::delete(collection, id));
        }
        Ok(removed)
    }
}
