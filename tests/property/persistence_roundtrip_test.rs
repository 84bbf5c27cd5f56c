//! Property-based tests for the Persistence Adapter.
//!
//! `load(save(X)) == X` for any well-formed collection, through both the
//! SQLite and the in-memory key/value store.

use std::sync::Arc;

use bookmarkpro::database::kv_store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, KEY_BOOKMARKS};
use bookmarkpro::database::Database;
use bookmarkpro::services::persistence::PersistenceAdapter;
use bookmarkpro::types::bookmark::Bookmark;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn arb_bookmark() -> impl Strategy<Value = Bookmark> {
    (
        "[a-z0-9-]{1,36}",
        "[a-z]{3,10}",
        "\\PC{1,40}",
        "\\PC{0,60}",
        prop::collection::vec("[a-z ]{1,12}", 0..5),
        0i64..4_000_000_000,
    )
        .prop_map(|(id, host, title, description, tags, secs)| Bookmark {
            id,
            url: format!("https://{}.example/", host),
            title,
            description,
            tags,
            date_added: Utc.timestamp_opt(secs, 0).single().unwrap_or_else(Utc::now),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn sqlite_roundtrip(bookmarks in prop::collection::vec(arb_bookmark(), 0..10)) {
        let kv = Arc::new(SqliteKeyValueStore::new(Database::open_in_memory().unwrap()));
        let adapter = PersistenceAdapter::new(kv);

        prop_assert!(adapter.save(&bookmarks));
        prop_assert_eq!(adapter.load(), bookmarks);
    }

    #[test]
    fn memory_roundtrip(bookmarks in prop::collection::vec(arb_bookmark(), 0..10)) {
        let adapter = PersistenceAdapter::new(Arc::new(MemoryKeyValueStore::new()));

        prop_assert!(adapter.save(&bookmarks));
        prop_assert_eq!(adapter.load(), bookmarks);
    }

    #[test]
    fn garbage_payload_loads_empty(payload in "\\PC{0,40}") {
        prop_assume!(serde_json::from_str::<Vec<Bookmark>>(&payload).is_err());
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(KEY_BOOKMARKS, &payload).unwrap();

        prop_assert!(PersistenceAdapter::new(kv).load().is_empty());
    }
}
