//! Document store abstraction
//!
//! Collections, the query model, and the `DocumentStore` port that both
//! storage backends implement.

pub mod collection;
pub mod query;
pub mod store;

pub use collection::Collection;
pub use query::{lookup, Filter, FilterOp, OrderBy, Page, Query, SortDirection, StoredDocument};
pub use store::{Document, DocumentStore, SharedDocumentStore};
