//! Unit tests for the RPC handler — the JSON-RPC methods dispatched by `handle_method`.
//!
//! These run through the same code path as the `bookmarkpro-rpc` binary,
//! with in-memory storage and an in-process cloud store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use bookmarkpro::app::App;
use bookmarkpro::database::kv_store::MemoryKeyValueStore;
use bookmarkpro::managers::bookmark_manager::BookmarkManagerTrait;
use bookmarkpro::rpc_handler::handle_method;
use bookmarkpro::services::cloud_store::{CloudDocumentStore, MemoryDocumentStore};
use bookmarkpro::services::identity::ProfileClient;
use bookmarkpro::services::settings_engine::SettingsEngine;
use bookmarkpro::types::errors::SessionError;
use bookmarkpro::types::session::UserProfile;
use bookmarkpro::types::settings::{AppSettings, ReconcilePolicy};

struct NoProfile;

#[async_trait]
impl ProfileClient for NoProfile {
    async fn fetch_profile(&self, _access_token: &str) -> Result<UserProfile, SessionError> {
        Err(SessionError::ProfileUnavailable("offline".to_string()))
    }
}

/// Create a started App with the three sample bookmarks.
async fn setup() -> (App, Arc<MemoryDocumentStore>) {
    let remote = Arc::new(MemoryDocumentStore::new());
    let cloud: Arc<dyn CloudDocumentStore> = remote.clone();
    let mut app = App::new(
        AppSettings::default(),
        Arc::new(MemoryKeyValueStore::new()),
        Some(cloud),
        Arc::new(NoProfile),
    )
    .expect("Failed to init App");
    app.startup().await;
    (app, remote)
}

async fn call(app: &mut App, method: &str, params: Value) -> Result<Value, String> {
    handle_method(app, method, &params).await
}

// ─── Unknown method ───

#[tokio::test]
async fn test_unknown_method_returns_error() {
    let (mut app, _remote) = setup().await;
    let res = call(&mut app, "nonexistent.method", json!({})).await;
    assert!(res.unwrap_err().contains("unknown method"));
}

// ─── Bookmarks ───

#[tokio::test]
async fn test_bookmark_add_and_list() {
    let (mut app, _remote) = setup().await;

    let res = call(&mut app, "bookmark.add", json!({
        "url": "https://example.com/docs",
        "title": "Example",
        "description": "An example",
        "tags": "Docs, examples"
    }))
    .await
    .unwrap();
    assert!(res.get("id").is_some());
    assert_eq!(res["tags"], json!(["docs", "examples"]));
    assert_eq!(
        res["favicon"],
        "https://www.google.com/s2/favicons?domain=example.com&sz=16"
    );
    assert!(res["displayDate"].as_str().is_some());

    let list = call(&mut app, "bookmark.list", json!({})).await.unwrap();
    let arr = list["bookmarks"].as_array().unwrap();
    assert_eq!(arr.len(), 4);
    assert_eq!(arr[0]["title"], "Example");
    assert_eq!(list["total"], 4);
}

#[tokio::test]
async fn test_bookmark_add_validation_errors() {
    let (mut app, _remote) = setup().await;

    let missing = call(&mut app, "bookmark.add", json!({"title": "x"})).await;
    assert_eq!(missing.unwrap_err(), "missing url");

    let dup = call(&mut app, "bookmark.add", json!({"url": "https://github.com", "title": "x"})).await;
    assert_eq!(dup.unwrap_err(), "This URL is already bookmarked: https://github.com");

    let blank = call(&mut app, "bookmark.add", json!({"url": "https://new.example", "title": " "})).await;
    assert_eq!(blank.unwrap_err(), "Title is required");
}

#[tokio::test]
async fn test_bookmark_update_get_delete() {
    let (mut app, _remote) = setup().await;
    let added = call(&mut app, "bookmark.add", json!({"url": "https://a.example", "title": "A"}))
        .await
        .unwrap();
    let id = added["id"].as_str().unwrap().to_string();

    let updated = call(&mut app, "bookmark.update", json!({"id": id, "title": "A2", "tags": ["X"]}))
        .await
        .unwrap();
    assert_eq!(updated["title"], "A2");
    assert_eq!(updated["url"], "https://a.example");
    assert_eq!(updated["tags"], json!(["x"]));

    let got = call(&mut app, "bookmark.get", json!({"id": id})).await.unwrap();
    assert_eq!(got["title"], "A2");

    let deleted = call(&mut app, "bookmark.delete", json!({"id": id})).await.unwrap();
    assert_eq!(deleted, json!({"ok": true}));
    assert_eq!(call(&mut app, "bookmark.get", json!({"id": id})).await.unwrap(), Value::Null);

}

#[tokio::test]
async fn test_update_unknown_id_is_silent_noop() {
    let (mut app, _remote) = setup().await;
    call(&mut app, "bookmark.add", json!({"url": "https://a.example", "title": "A"}))
        .await
        .unwrap();
    let before = app.bookmarks.bookmarks().to_vec();
    let revision = app.bookmarks.revision();

    let res = call(&mut app, "bookmark.update", json!({"id": "nope", "title": "T"})).await;

    assert_eq!(res, Ok(Value::Null));
    assert_eq!(app.bookmarks.bookmarks(), before.as_slice());
    assert_eq!(app.bookmarks.revision(), revision);
}

#[tokio::test]
async fn test_suggest_title() {
    let (mut app, _remote) = setup().await;
    let res = call(&mut app, "bookmark.suggest_title", json!({"url": "https://example.com/rust-async_book"}))
        .await
        .unwrap();
    assert_eq!(res["title"], "Rust Async Book");
}

// ─── Filter ───

#[tokio::test]
async fn test_filter_flow() {
    let (mut app, _remote) = setup().await;

    let state = call(&mut app, "filter.search", json!({"query": "grid"})).await.unwrap();
    assert_eq!(state["visible"], 1);
    assert_eq!(state["active"], true);

    let state = call(&mut app, "filter.toggle_tag", json!({"tag": "css"})).await.unwrap();
    assert_eq!(state["tags"], json!(["css"]));
    assert_eq!(state["visible"], 1);

    let list = call(&mut app, "bookmark.list", json!({})).await.unwrap();
    assert_eq!(list["bookmarks"][0]["title"], "CSS Grid Guide");

    let tags = call(&mut app, "tags.list", json!({})).await.unwrap();
    let css = tags.as_array().unwrap().iter().find(|t| t["tag"] == "css").unwrap();
    assert_eq!(css["selected"], true);

    let state = call(&mut app, "filter.clear", json!({})).await.unwrap();
    assert_eq!(state["visible"], 3);
    assert_eq!(state["active"], false);
}

// ─── Auth + Sync ───

#[tokio::test]
async fn test_auth_flow_with_placeholder_profile() {
    let (mut app, _remote) = setup().await;

    let status = call(&mut app, "auth.status", json!({})).await.unwrap();
    assert_eq!(status["state"], "signed_out");

    let res = call(&mut app, "auth.sign_in", json!({})).await.unwrap();
    assert!(res["authorization_url"].as_str().unwrap().starts_with("https://accounts.google.com/"));
    assert_eq!(call(&mut app, "auth.status", json!({})).await.unwrap()["state"], "authenticating");

    let status = call(&mut app, "auth.token_response", json!({"access_token": "token-123"}))
        .await
        .unwrap();
    assert_eq!(status["state"], "signed_in");
    assert_eq!(status["user"]["name"], "User");

    let res = call(&mut app, "auth.sign_out", json!({})).await.unwrap();
    assert_eq!(res, json!({"ok": true}));

    let notes = call(&mut app, "notifications.drain", json!({})).await.unwrap();
    let last = notes.as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["kind"], "success");
    assert_eq!(last["message"], "Signed out successfully");
}

#[tokio::test]
async fn test_token_error_response() {
    let (mut app, _remote) = setup().await;
    call(&mut app, "auth.sign_in", json!({})).await.unwrap();

    let res = call(&mut app, "auth.token_response", json!({"error": "access_denied"})).await;
    assert!(res.unwrap_err().contains("access_denied"));
    assert_eq!(call(&mut app, "auth.status", json!({})).await.unwrap()["state"], "signed_out");
}

#[tokio::test]
async fn test_sync_requires_sign_in() {
    let (mut app, _remote) = setup().await;
    assert_eq!(
        call(&mut app, "sync.now", json!({})).await.unwrap_err(),
        "Please sign in to sync bookmarks"
    );
    assert!(call(&mut app, "sync.pull", json!({})).await.is_err());
}

#[tokio::test]
async fn test_sync_now_and_pull() {
    let (mut app, remote) = setup().await;
    call(&mut app, "auth.sign_in", json!({})).await.unwrap();
    call(&mut app, "auth.token_response", json!({"access_token": "token-123"}))
        .await
        .unwrap();

    let pushed = call(&mut app, "sync.now", json!({})).await.unwrap();
    assert_eq!(pushed["action"], "created");
    assert_eq!(pushed["count"], 3);
    assert_eq!(remote.write_count(), 1);

    let pulled = call(&mut app, "sync.pull", json!({})).await.unwrap();
    assert_eq!(pulled, json!({"action": "merged", "added": 0}));
}

// ─── Settings ───

#[tokio::test]
async fn test_settings_get_set_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json").to_string_lossy().to_string();
    let (app, _remote) = setup().await;
    let mut app = app.with_settings_engine(SettingsEngine::new(Some(path.clone())));

    let settings = call(&mut app, "settings.get", json!({})).await.unwrap();
    assert_eq!(settings["sync"]["policy"], "merge");

    let res = call(&mut app, "settings.set", json!({"key": "sync.policy", "value": "replace"})).await;
    assert_eq!(res, Ok(json!({"ok": true})));
    assert_eq!(app.settings.sync.policy, ReconcilePolicy::Replace);
    assert_eq!(app.sync_bridge().map(|b| b.policy()), Some(ReconcilePolicy::Replace));
    assert!(std::fs::read_to_string(&path).unwrap().contains("replace"));

    call(&mut app, "settings.set", json!({"key": "sync.enabled", "value": false}))
        .await
        .unwrap();
    assert!(app.sync_bridge().is_none());
    assert_eq!(
        call(&mut app, "sync.now", json!({})).await.unwrap_err(),
        "Cloud sync is disabled"
    );

    call(&mut app, "settings.reset", json!({})).await.unwrap();
    assert_eq!(app.settings, AppSettings::default());
    assert!(app.sync_bridge().is_some());
}

#[tokio::test]
async fn test_settings_set_rejects_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json").to_string_lossy().to_string();
    let (app, _remote) = setup().await;
    let mut app = app.with_settings_engine(SettingsEngine::new(Some(path)));

    let res = call(&mut app, "settings.set", json!({"key": "sync.nope", "value": 1})).await;
    assert!(res.unwrap_err().contains("Invalid settings key"));

    let res = call(&mut app, "settings.set", json!({"key": "sync.auto_push", "value": "yes"})).await;
    assert!(res.unwrap_err().contains("Invalid settings value"));
    assert!(app.settings.sync.auto_push);

    assert_eq!(
        call(&mut app, "settings.set", json!({"key": "sync.policy"})).await.unwrap_err(),
        "missing value"
    );
}

#[tokio::test]
async fn test_settings_set_without_file_fails() {
    let (mut app, _remote) = setup().await;
    let res = call(&mut app, "settings.set", json!({"key": "sync.policy", "value": "replace"})).await;
    assert!(res.unwrap_err().contains("not backed by a file"));
    assert_eq!(app.settings.sync.policy, ReconcilePolicy::Merge);
}
