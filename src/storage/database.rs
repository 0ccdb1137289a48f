//! SQLite collection store using rusqlite.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use serde_json::Value;

use super::collection::{CollectionStore, StoreError};
use super::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::IoError(e.to_string()))?;
            }
        }

        let conn =
            Connection::open(path).map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.initialize()?;

        Ok(db)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.connection()?;

        conn.execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;

        let current_version = Self::get_schema_version(&conn)?;

        if current_version < CURRENT_VERSION {
            Self::migrate(&conn, current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(conn: &Connection) -> Result<i32, StoreError> {
        let result: SqliteResult<i32> = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(StoreError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(conn: &Connection, from_version: i32) -> Result<(), StoreError> {
        if from_version < 1 {
            conn.execute_batch(SCHEMA)
                .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;

            conn.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                [CURRENT_VERSION],
            )
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        Ok(())
    }

    /// Names of all collections that have been written at least once.
    pub fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare("SELECT name FROM collections ORDER BY name ASC")
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))
    }
}

fn read_items(conn: &Connection, collection: &str) -> Result<Vec<Value>, StoreError> {
    let items_json: Option<String> = conn
        .query_row(
            "SELECT items_json FROM collections WHERE name = ?1",
            params![collection],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

    match items_json {
        Some(json) => serde_json::from_str(&json).map_err(|e| StoreError::Serialization {
            collection: collection.to_string(),
            message: e.to_string(),
        }),
        None => Ok(Vec::new()),
    }
}

fn write_items(conn: &Connection, collection: &str, items: &[Value]) -> Result<(), StoreError> {
    let items_json = serde_json::to_string(items).map_err(|e| StoreError::Serialization {
        collection: collection.to_string(),
        message: e.to_string(),
    })?;

    conn.execute(
        "INSERT INTO collections (name, items_json, item_count, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(name) DO UPDATE SET
            items_json = excluded.items_json,
            item_count = excluded.item_count,
            updated_at = excluded.updated_at",
        params![collection, items_json, items.len() as i64, Utc::now().to_rfc3339()],
    )
    .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

    Ok(())
}

impl CollectionStore for Database {
    fn get(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let conn = self.connection()?;
        read_items(&conn, collection)
    }

    fn set(&self, collection: &str, items: &[Value]) -> Result<(), StoreError> {
        let conn = self.connection()?;
        write_items(&conn, collection, items)
    }

    fn update(
        &self,
        collection: &str,
        apply: &mut dyn FnMut(&mut Vec<Value>),
    ) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let mut items = read_items(&tx, collection)?;
        apply(&mut items);
        write_items(&tx, collection, &items)?;

        tx.commit()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
