//! BookmarkPro local storage layer.
//!
//! Provides SQLite connection management, schema migrations and the string
//! key/value store the rest of the crate persists through.
//!
//! # Usage
//!
//! ```no_run
//! use bookmarkpro::database::{Database, KeyValueStore, SqliteKeyValueStore};
//!
//! let db = Database::open("bookmarkpro.db").expect("failed to open database");
//! let store = SqliteKeyValueStore::new(db);
//! store.set("initialized", "true").expect("write failed");
//! ```

pub mod connection;
pub mod kv_store;
pub mod migrations;

pub use connection::Database;
pub use kv_store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
