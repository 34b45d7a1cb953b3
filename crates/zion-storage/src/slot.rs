//! Persisted key-value slots.
//!
//! A slot holds one serialized record under a string key. Writes replace
//! the whole value (last write wins).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rusqlite::OptionalExtension;

use zion_core::error::ZionError;

use crate::db::Database;

/// A string-keyed store of serialized records.
pub trait SlotStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>, ZionError>;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), ZionError>;
}

/// Slots kept in the `kv_slots` SQLite table.
#[derive(Debug, Clone)]
pub struct SqliteSlotStore {
    db: Arc<Database>,
}

impl SqliteSlotStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl SlotStore for SqliteSlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, ZionError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM kv_slots WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| ZionError::Storage(format!("Failed to read slot '{}': {}", key, e)))
        })
    }

    fn write(&self, key: &str, value: &str) -> Result<(), ZionError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_slots (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%s', 'now'))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at",
                rusqlite::params![key, value],
            )
            .map_err(|e| ZionError::Storage(format!("Failed to write slot '{}': {}", key, e)))?;
            Ok(())
        })
    }
}

/// Slots held in process memory.
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, ZionError> {
        self.slots
            .lock()
            .map_err(|e| ZionError::Storage(format!("slot lock poisoned: {}", e)))
    }
}

impl SlotStore for MemorySlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, ZionError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), ZionError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
