//! Unit tests for the Cloud Sync Bridge against the in-process document store.

use std::sync::Arc;

use bookmarkpro::database::kv_store::MemoryKeyValueStore;
use bookmarkpro::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use bookmarkpro::services::cloud_store::{CloudDocumentStore, MemoryDocumentStore};
use bookmarkpro::services::cloud_sync::CloudSyncBridge;
use bookmarkpro::services::filter_engine;
use bookmarkpro::services::persistence::PersistenceAdapter;
use bookmarkpro::types::bookmark::Bookmark;
use bookmarkpro::types::errors::SyncError;
use bookmarkpro::types::filter::FilterState;
use bookmarkpro::types::settings::{ReconcilePolicy, SyncSettings};
use bookmarkpro::types::sync::{PushOutcome, ReconcileOutcome, SyncEvent};
use chrono::Utc;
use serde_json::json;

const DOC: &str = "bookmarkpro-bookmarks.json";
const TOKEN: &str = "token-123";

fn record(id: &str, url: &str) -> Bookmark {
    Bookmark {
        id: id.to_string(),
        url: url.to_string(),
        title: format!("Title {}", id),
        description: String::new(),
        tags: vec!["t".to_string()],
        date_added: Utc::now(),
    }
}

fn bridge(policy: ReconcilePolicy) -> (CloudSyncBridge, Arc<MemoryDocumentStore>) {
    let remote = Arc::new(MemoryDocumentStore::new());
    let store: Arc<dyn CloudDocumentStore> = remote.clone();
    let settings = SyncSettings {
        policy,
        ..SyncSettings::default()
    };
    (CloudSyncBridge::new(store, &settings), remote)
}

fn local(records: Vec<Bookmark>) -> BookmarkManager {
    let kv = Arc::new(MemoryKeyValueStore::new());
    let mut mgr = BookmarkManager::new(PersistenceAdapter::new(kv).without_sample_data());
    mgr.load();
    mgr.replace_all(records);
    mgr
}

#[tokio::test]
async fn test_push_creates_then_updates() {
    let (bridge, remote) = bridge(ReconcilePolicy::Merge);
    let records = vec![record("a", "https://a.example")];

    let first = bridge.push(TOKEN, &records).await.unwrap();
    assert!(matches!(first, PushOutcome::Created { count: 1, .. }));

    let second = bridge.push(TOKEN, &[]).await.unwrap();
    assert!(matches!(second, PushOutcome::Updated { count: 0, .. }));

    assert_eq!(remote.document_count(), 1);
    assert_eq!(remote.content_of(DOC).as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_pushed_document_is_pretty_camel_case_json() {
    let (bridge, remote) = bridge(ReconcilePolicy::Merge);
    bridge.push(TOKEN, &[record("a", "https://a.example")]).await.unwrap();

    let content = remote.content_of(DOC).unwrap();
    assert!(content.contains('\n'), "document should be pretty-printed");
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert!(parsed[0].get("dateAdded").is_some());
}

#[tokio::test]
async fn test_pull_absent_empty_and_empty_array() {
    let (bridge, remote) = bridge(ReconcilePolicy::Merge);
    assert_eq!(bridge.pull(TOKEN).await.unwrap(), None);

    remote.insert(DOC, "   ");
    assert_eq!(bridge.pull(TOKEN).await.unwrap(), None);

    let (bridge, remote) = self::bridge(ReconcilePolicy::Merge);
    remote.insert(DOC, "[]");
    assert_eq!(bridge.pull(TOKEN).await.unwrap(), None);
}

#[tokio::test]
async fn test_pull_garbage_is_invalid_document() {
    let (bridge, remote) = bridge(ReconcilePolicy::Merge);
    remote.insert(DOC, "<html>");
    assert!(matches!(bridge.pull(TOKEN).await, Err(SyncError::InvalidDocument(_))));
}

#[tokio::test]
async fn test_merge_prepends_remote_only_records() {
    let (bridge, remote) = bridge(ReconcilePolicy::Merge);
    let remote_records = vec![record("b", "https://b.example"), record("c", "https://c.example")];
    remote.insert(DOC, &serde_json::to_string(&remote_records).unwrap());

    let mut mgr = local(vec![record("a", "https://a.example"), record("b-local", "https://b.example")]);
    let outcome = bridge.pull_and_reconcile(TOKEN, &mut mgr).await.unwrap();

    assert_eq!(outcome, ReconcileOutcome::Merged { added: 1 });
    let ids: Vec<&str> = mgr.bookmarks().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b-local"]);
}

#[tokio::test]
async fn test_merge_skips_malformed_elements() {
    let (bridge, _remote) = bridge(ReconcilePolicy::Merge);
    let mut mgr = local(vec![]);
    let document = json!([
        {"id": "x", "url": "https://x.example", "title": "X", "dateAdded": "2024-05-01T10:00:00Z"},
        {"id": "broken"}
    ]);

    assert_eq!(bridge.reconcile(&mut mgr, document), ReconcileOutcome::Merged { added: 1 });
    assert_eq!(mgr.len(), 1);
}

#[tokio::test]
async fn test_merge_normalizes_remote_tags_and_drops_invalid_urls() {
    let (bridge, _remote) = bridge(ReconcilePolicy::Merge);
    let mut mgr = local(vec![]);
    let document = json!([
        {"id": "ok", "url": "https://ok.example", "title": "Ok", "tags": ["Rust", " Web "], "dateAdded": "2024-05-01T10:00:00Z"},
        {"id": "bad", "url": "ok.example/no-scheme", "title": "Bad", "dateAdded": "2024-05-01T10:00:00Z"}
    ]);

    assert_eq!(bridge.reconcile(&mut mgr, document), ReconcileOutcome::Merged { added: 1 });
    assert_eq!(mgr.bookmarks()[0].id, "ok");
    assert_eq!(mgr.bookmarks()[0].tags, vec!["rust", "web"]);

    let mut filter = FilterState::new();
    filter.toggle_tag("Rust");
    assert_eq!(filter_engine::filter(mgr.bookmarks(), &filter).len(), 1);
}

#[tokio::test]
async fn test_replace_drops_invalid_remote_urls() {
    let (bridge, _remote) = bridge(ReconcilePolicy::Replace);
    let mut mgr = local(vec![record("a", "https://a.example")]);
    let document = json!([
        {"id": "r", "url": "https://r.example", "title": "R", "tags": ["CSS"], "dateAdded": "2024-05-01T10:00:00Z"},
        {"id": "bad", "url": "", "title": "Bad", "dateAdded": "2024-05-01T10:00:00Z"}
    ]);

    assert_eq!(bridge.reconcile(&mut mgr, document), ReconcileOutcome::Replaced { count: 1 });
    assert_eq!(mgr.bookmarks()[0].tags, vec!["css"]);
}

#[tokio::test]
async fn test_replace_supersedes_local() {
    let (bridge, remote) = bridge(ReconcilePolicy::Replace);
    remote.insert(DOC, &serde_json::to_string(&vec![record("r", "https://r.example")]).unwrap());

    let mut mgr = local(vec![record("a", "https://a.example")]);
    let outcome = bridge.pull_and_reconcile(TOKEN, &mut mgr).await.unwrap();

    assert_eq!(outcome, ReconcileOutcome::Replaced { count: 1 });
    assert_eq!(mgr.bookmarks()[0].id, "r");
}

#[tokio::test]
async fn test_replace_with_malformed_document_empties_store() {
    let (bridge, _remote) = bridge(ReconcilePolicy::Replace);
    let mut mgr = local(vec![record("a", "https://a.example")]);

    let outcome = bridge.reconcile(&mut mgr, json!({"not": "a list"}));

    assert_eq!(outcome, ReconcileOutcome::Replaced { count: 0 });
    assert!(mgr.is_empty());
}

#[tokio::test]
async fn test_absent_remote_leaves_local_untouched() {
    let (bridge, _remote) = bridge(ReconcilePolicy::Replace);
    let mut mgr = local(vec![record("a", "https://a.example")]);

    let outcome = bridge.pull_and_reconcile(TOKEN, &mut mgr).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::NoRemote);
    assert_eq!(mgr.len(), 1);
}

#[tokio::test]
async fn test_network_failure_surfaces_error() {
    let (bridge, remote) = bridge(ReconcilePolicy::Merge);
    remote.set_failing(true);

    assert!(matches!(bridge.push(TOKEN, &[]).await, Err(SyncError::NetworkError(_))));
    assert!(matches!(bridge.pull(TOKEN).await, Err(SyncError::NetworkError(_))));
}

#[tokio::test]
async fn test_scheduled_pushes_coalesce_to_latest() {
    let (mut bridge, remote) = bridge(ReconcilePolicy::Merge);

    let handles: Vec<_> = (1..=3)
        .map(|n| {
            let records: Vec<Bookmark> = (0..n)
                .map(|i| record(&i.to_string(), &format!("https://{}.example", i)))
                .collect();
            bridge.schedule_push(TOKEN, records).expect("inside a runtime")
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(remote.write_count(), 1);
    let remote_records: Vec<Bookmark> = serde_json::from_str(&remote.content_of(DOC).unwrap()).unwrap();
    assert_eq!(remote_records.len(), 3);

    let events = bridge.drain_events();
    assert_eq!(events.len(), 3);
    let superseded = events
        .iter()
        .filter(|e| matches!(e, SyncEvent::Pushed { outcome: PushOutcome::Superseded, .. }))
        .count();
    assert_eq!(superseded, 2);
    assert!(events.contains(&SyncEvent::Pushed {
        generation: 3,
        outcome: PushOutcome::Created {
            document_id: "doc-1".to_string(),
            count: 3
        }
    }));
    assert!(bridge.drain_events().is_empty());
}

#[tokio::test]
async fn test_scheduled_push_failure_is_reported() {
    let (mut bridge, remote) = bridge(ReconcilePolicy::Merge);
    remote.set_failing(true);

    bridge.schedule_push(TOKEN, vec![]).unwrap().await.unwrap();

    let events = bridge.drain_events();
    assert!(matches!(events.as_slice(), [SyncEvent::PushFailed { generation: 1, .. }]));
}

#[test]
fn test_schedule_outside_runtime_is_skipped() {
    let (bridge, remote) = bridge(ReconcilePolicy::Merge);
    assert!(bridge.schedule_push(TOKEN, vec![]).is_none());
    assert_eq!(remote.write_count(), 0);
}
