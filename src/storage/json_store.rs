//! Single-document JSON file store.
//!
//! All collections live in one JSON object keyed by collection name, the
//! same layout as the `db.json` used by the local dispatch server.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};

use super::collection::{CollectionStore, StoreError};

/// File-backed store. The document is re-read on every access so that edits
/// made by other tools are picked up.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store at the given path. The file is created on first write.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StoreError::IoError(e.to_string()))?;
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| StoreError::IoError(e.to_string()))?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::Corrupt(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
            Err(e) => {
                tracing::error!("Failed to parse {}: {}", self.path.display(), e);
                Err(StoreError::Corrupt(e.to_string()))
            }
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(document).map_err(|e| {
            StoreError::Serialization {
                collection: "*".to_string(),
                message: e.to_string(),
            }
        })?;

        // Write a sibling file, then rename over the target.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|e| StoreError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::IoError(e.to_string()))?;

        Ok(())
    }
}

fn collection_items(document: &Map<String, Value>, collection: &str) -> Result<Vec<Value>, StoreError> {
    match document.get(collection) {
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(_) => Err(StoreError::Corrupt(format!(
            "collection '{}' is not an array",
            collection
        ))),
    }
}

impl CollectionStore for JsonFileStore {
    fn get(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let document = self.read_document()?;
        collection_items(&document, collection)
    }

    fn set(&self, collection: &str, items: &[Value]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;

        let mut document = self.read_document()?;
        document.insert(collection.to_string(), Value::Array(items.to_vec()));
        self.write_document(&document)
    }

    fn update(
        &self,
        collection: &str,
        apply: &mut dyn FnMut(&mut Vec<Value>),
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;

        let mut document = self.read_document()?;
        let mut items = collection_items(&document, collection)?;
        apply(&mut items);
        document.insert(collection.to_string(), Value::Array(items));
        self.write_document(&document)
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}
