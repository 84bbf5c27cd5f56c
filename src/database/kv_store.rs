//! Durable string key/value storage.
//!
//! [`KeyValueStore`] is the seam every durable writer goes through: the
//! persistence adapter owns the `bookmarks`/`initialized` keys and the session
//! manager owns `accessToken`/`currentUser`.

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::{params, OptionalExtension};

use super::connection::Database;
use crate::types::errors::StorageError;

/// Storage key holding the JSON array of bookmarks.
pub const KEY_BOOKMARKS: &str = "bookmarks";
/// Storage key holding the "sample data already seeded" sentinel.
pub const KEY_INITIALIZED: &str = "initialized";
/// Storage key holding the sealed access token.
pub const KEY_ACCESS_TOKEN: &str = "accessToken";
/// Storage key holding the JSON user profile.
pub const KEY_CURRENT_USER: &str = "currentUser";

/// Trait defining durable key/value operations. Values are always strings.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Key/value store backed by the `local_storage` SQLite table.
pub struct SqliteKeyValueStore {
    db: Mutex<Database>,
}

impl SqliteKeyValueStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn with_db<T>(
        &self,
        f: impl FnOnce(&Database) -> Result<T, rusqlite::Error>,
    ) -> Result<T, StorageError> {
        let db = self
            .db
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        f(&db).map_err(StorageError::from)
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_db(|db| {
            db.connection()
                .query_row(
                    "SELECT value FROM local_storage WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = chrono::Utc::now().timestamp();
        self.with_db(|db| {
            db.connection().execute(
                "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
        })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.with_db(|db| {
            db.connection()
                .execute("DELETE FROM local_storage WHERE key = ?1", params![key])
        })?;
        Ok(())
    }
}

/// Volatile key/value store used when no database can be opened, and in tests.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}
