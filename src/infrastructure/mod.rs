pub mod database;
pub mod storage;

pub use database::{init_database, DatabaseConfig, SeaOrmDocumentStore};
pub use storage::{DeadlineStore, InMemoryDocumentStore};

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::application::events::SharedEventBus;
use crate::config::{StoreBackend, StoreConfig};
use crate::domain::document::SharedDocumentStore;
use crate::domain::DomainResult;

/// Build the configured store backend, wrapped in the operation deadline.
///
/// The sqlite backend runs pending migrations unless `migrate` is false.
pub async fn open_store(
    config: &StoreConfig,
    event_bus: SharedEventBus,
    migrate: bool,
) -> DomainResult<SharedDocumentStore> {
    let store: SharedDocumentStore = match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory document store");
            Arc::new(InMemoryDocumentStore::new(event_bus))
        }
        StoreBackend::Sqlite => {
            let db = init_database(&DatabaseConfig {
                url: config.database_url.clone(),
            })
            .await?;
            if migrate {
                info!("Running database migrations...");
                database::migrator::Migrator::up(&db, None).await?;
                info!("Migrations completed");
            }
            Arc::new(SeaOrmDocumentStore::new(db, event_bus))
        }
    };

    let timeout = config.operation_timeout();
    if timeout.is_zero() {
        return Ok(store);
    }
    Ok(Arc::new(DeadlineStore::new(store, timeout)))
}
