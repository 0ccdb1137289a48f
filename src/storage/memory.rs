//! In-memory collection store.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use super::collection::{CollectionStore, StoreError};

/// Volatile store backed by a map. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CollectionStore for MemoryStore {
    fn get(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    fn set(&self, collection: &str, items: &[Value]) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        collections.insert(collection.to_string(), items.to_vec());
        Ok(())
    }

    fn update(
        &self,
        collection: &str,
        apply: &mut dyn FnMut(&mut Vec<Value>),
    ) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        apply(collections.entry(collection.to_string()).or_default());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
