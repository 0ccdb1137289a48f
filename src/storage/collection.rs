//! Collection store contract.
//!
//! Every backend exposes the same opaque API: a named collection is read
//! as a whole array of JSON records and written back as a whole array.
//! Services never depend on a particular backend, only on this trait.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Well-known collection names, matching the keys of an existing `db.json`.
pub mod names {
    pub const MESSENGERS: &str = "messengers";
    pub const CLIENTS: &str = "clients";
    pub const VEHICLES: &str = "vehicles";
    pub const GAMIFICATION_RULES: &str = "gamificationRules";
    pub const ROUTE_HISTORY: &str = "routeHistory";
    pub const CLIENT_ROUTE_STATS: &str = "clientRouteStats";
    pub const POINT_LEDGER: &str = "pointLedger";
    pub const MESSENGER_EVALUATIONS: &str = "messengerEvaluations";
}

/// Key/array storage used by every service in the crate.
pub trait CollectionStore: Send + Sync {
    /// Read a whole collection. A collection that was never written is empty.
    fn get(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Replace a whole collection.
    fn set(&self, collection: &str, items: &[Value]) -> Result<(), StoreError>;

    /// Read, modify and write back a collection as one step. No other
    /// write to the store can interleave with it.
    fn update(
        &self,
        collection: &str,
        apply: &mut dyn FnMut(&mut Vec<Value>),
    ) -> Result<(), StoreError>;

    /// Short backend name for log lines.
    fn backend_name(&self) -> &'static str;
}

/// Read a collection and deserialize every record.
pub fn load<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    collection: &str,
) -> Result<Vec<T>, StoreError> {
    store
        .get(collection)?
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).map_err(|e| StoreError::Serialization {
                collection: collection.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Serialize every record and replace the collection.
pub fn save<T: Serialize>(
    store: &dyn CollectionStore,
    collection: &str,
    items: &[T],
) -> Result<(), StoreError> {
    let values = items
        .iter()
        .map(|item| {
            serde_json::to_value(item).map_err(|e| StoreError::Serialization {
                collection: collection.to_string(),
                message: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    store.set(collection, &values)
}

/// Append one record to a collection atomically.
pub fn append<T: Serialize>(
    store: &dyn CollectionStore,
    collection: &str,
    item: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(item).map_err(|e| StoreError::Serialization {
        collection: collection.to_string(),
        message: e.to_string(),
    })?;
    let mut pending = Some(value);
    store.update(collection, &mut |values| values.extend(pending.take()))
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Corrupt store document: {0}")]
    Corrupt(String),

    #[error("Serialization error in '{collection}': {message}")]
    Serialization { collection: String, message: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}
