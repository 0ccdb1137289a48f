//! Storage module: collection backends and configuration.

pub mod collection;
pub mod config;
pub mod database;
pub mod json_store;
pub mod memory;
pub mod schema;

use std::sync::Arc;

pub use collection::{names, CollectionStore, StoreError};
pub use config::{AppConfig, ConfigError, ScoringSettings, StorageBackend, StorageSettings};
pub use database::Database;
pub use json_store::JsonFileStore;
pub use memory::MemoryStore;

/// Open the backend selected by the configuration.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn CollectionStore>, StoreError> {
    let path = config.store_path();
    tracing::info!(
        "Opening {} store at {}",
        config.storage.backend,
        path.display()
    );

    let store: Arc<dyn CollectionStore> = match config.storage.backend {
        StorageBackend::Json => Arc::new(JsonFileStore::open(&path)?),
        StorageBackend::Sqlite => Arc::new(Database::open(&path)?),
    };

    Ok(store)
}
