use rusqlite::Connection;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::models::{Item, Transaction};

pub const ITEMS_KEY: &str = "flowzen-items";
pub const TRANSACTIONS_KEY: &str = "flowzen-transactions";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Failed to serialize '{key}': {source}")]
    SerializeError {
        key: String,
        source: serde_json::Error,
    },
    #[error("Stored value for '{key}' is unreadable: {source}")]
    CorruptValue {
        key: String,
        source: serde_json::Error,
    },
}

/// Opaque string-keyed store holding whole serialized collections.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Overwrites the value under `key` in a single write.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store, used for tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite file holding one row per key.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store file and initialize the schema
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        let store = SqliteStore { conn };
        store.initialize_schema()?;
        debug!(path = %db_path.display(), "opened key-value store");

        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = SqliteStore {
            conn: Connection::open_in_memory()?,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key             TEXT PRIMARY KEY NOT NULL,
                value           TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, now],
        )?;
        Ok(())
    }
}

/// Reads a whole collection; a missing key is an empty collection.
pub fn load_collection<T, S>(store: &S, key: &str) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        debug!(key, "no stored collection");
        return Ok(Vec::new());
    };
    let values: Vec<T> = serde_json::from_str(&raw).map_err(|source| StoreError::CorruptValue {
        key: key.to_string(),
        source,
    })?;
    debug!(key, count = values.len(), "hydrated collection");
    Ok(values)
}

/// Overwrites the whole collection under `key`.
pub fn save_collection<T, S>(store: &mut S, key: &str, values: &[T]) -> Result<(), StoreError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(values).map_err(|source| StoreError::SerializeError {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

pub fn load_items<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<Item>, StoreError> {
    load_collection(store, ITEMS_KEY)
}

pub fn save_items<S: KeyValueStore + ?Sized>(store: &mut S, items: &[Item]) -> Result<(), StoreError> {
    save_collection(store, ITEMS_KEY, items)
}

pub fn load_transactions<S: KeyValueStore + ?Sized>(
    store: &S,
) -> Result<Vec<Transaction>, StoreError> {
    load_collection(store, TRANSACTIONS_KEY)
}

pub fn save_transactions<S: KeyValueStore + ?Sized>(
    store: &mut S,
    transactions: &[Transaction],
) -> Result<(), StoreError> {
    save_collection(store, TRANSACTIONS_KEY, transactions)
}
