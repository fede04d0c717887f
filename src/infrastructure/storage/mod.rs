//! Document store backends that need no database

pub mod deadline;
pub mod memory;

pub use deadline::DeadlineStore;
pub use memory::InMemoryDocumentStore;
