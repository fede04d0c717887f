//! Change-feed events
//!
//! Every successful store write publishes one `DocumentChange`. The
//! subscription hub consumes them to refresh live queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::document::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Put,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChange {
    pub collection: Collection,
    pub id: String,
    pub kind: ChangeKind,
    pub timestamp: DateTime<Utc>,
}

impl DocumentChange {
    pub fn put(collection: Collection, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: id.into(),
            kind: ChangeKind::Put,
            timestamp: Utc::now(),
        }
    }

    pub fn delete(collection: Collection, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: id.into(),
            kind: ChangeKind::Delete,
            timestamp: Utc::now(),
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self.kind {
            ChangeKind::Put => "document_put",
            ChangeKind::Delete => "document_deleted",
        }
    }
}
