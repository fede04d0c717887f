//! # BeautyMarket Service Catalog
//!
//! Two-tier catalog for a beauty-services marketplace: admins define
//! categories and canonical base services, professionals publish priced
//! offerings of those services, and clients discover providers through a
//! denormalized, live-updating read model.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Entities, the offering validation engine, the document
//!   store port and the query model
//! - **application**: Catalog services, the provider projector, the change
//!   feed and the subscription hub
//! - **infrastructure**: Document store backends (in-memory, SeaORM/SQLite)
//! - **shared**: Errors, input validation and deadlines

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, init_tracing, AppConfig};

pub use application::{create_event_bus, Catalog, EventBus, SharedEventBus, Subscription};

pub use infrastructure::{open_store, InMemoryDocumentStore, SeaOrmDocumentStore};

pub use shared::errors::{DomainError, DomainResult, ErrorKind, ErrorPayload};
