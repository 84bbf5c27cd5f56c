//! RPC method handler for the BookmarkPro JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be tested without stdio.
//! `handle_method` dispatches a method call to the [`App`].

use chrono::SecondsFormat;
use serde_json::{json, Value};

use crate::app::App;
use crate::managers::bookmark_manager::BookmarkManagerTrait;
use crate::services::link_preview;
use crate::types::bookmark::{parse_tag_input, Bookmark, BookmarkDraft, BookmarkPatch};
use crate::types::session::{SessionState, TokenResponse};

fn str_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

fn required<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    str_param(params, key).ok_or_else(|| format!("missing {}", key))
}

/// Tags may arrive as an array or as the comma-separated form input.
fn tags_param(params: &Value) -> Option<Vec<String>> {
    match params.get("tags")? {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        Value::String(s) => Some(parse_tag_input(s)),
        _ => None,
    }
}

/// Card model for one bookmark, with the derived display fields.
pub fn bookmark_card(app: &App, bookmark: &Bookmark) -> Value {
    json!({
        "id": bookmark.id,
        "url": bookmark.url,
        "title": bookmark.title,
        "description": bookmark.description,
        "tags": bookmark.tags,
        "dateAdded": bookmark.date_added.to_rfc3339_opts(SecondsFormat::Millis, true),
        "displayDate": link_preview::display_date(&bookmark.date_added),
        "favicon": link_preview::favicon_url(&app.settings.library.favicon_service, &bookmark.url),
    })
}

fn filter_state(app: &App) -> Value {
    let visible = app.visible();
    json!({
        "search": app.filter.search,
        "tags": app.filter.tags,
        "active": app.filter.is_active(),
        "visible": visible.len(),
        "total": app.bookmarks.len(),
    })
}

fn session_status(app: &App) -> Value {
    match app.session.state() {
        SessionState::SignedIn(session) => json!({
            "state": app.session.state().name(),
            "user": session.user,
        }),
        other => json!({"state": other.name(), "user": Value::Null}),
    }
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &mut App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── Bookmarks ───
        "bookmark.add" => {
            let mut draft = BookmarkDraft::new(required(params, "url")?, required(params, "title")?);
            if let Some(description) = str_param(params, "description") {
                draft = draft.with_description(description);
            }
            if let Some(tags) = tags_param(params) {
                draft = draft.with_tags(tags);
            }
            let bookmark = app.add_bookmark(draft).map_err(|e| e.to_string())?;
            Ok(bookmark_card(app, &bookmark))
        }
        "bookmark.update" => {
            let id = required(params, "id")?;
            let patch = BookmarkPatch {
                url: str_param(params, "url").map(str::to_string),
                title: str_param(params, "title").map(str::to_string),
                description: str_param(params, "description").map(str::to_string),
                tags: tags_param(params),
            };
            // An unknown id is a no-op, answered with null like `bookmark.get`.
            match app.update_bookmark(id, patch).map_err(|e| e.to_string())? {
                Some(bookmark) => Ok(bookmark_card(app, &bookmark)),
                None => Ok(Value::Null),
            }
        }
        "bookmark.delete" => {
            let id = required(params, "id")?;
            let removed = app.delete_bookmark(id).is_some();
            Ok(json!({"ok": removed}))
        }
        "bookmark.get" => {
            let id = required(params, "id")?;
            match app.bookmarks.get(id) {
                Some(bookmark) => Ok(bookmark_card(app, bookmark)),
                None => Ok(Value::Null),
            }
        }
        "bookmark.list" => {
            let cards: Vec<Value> = app.visible().iter().map(|b| bookmark_card(app, b)).collect();
            Ok(json!({
                "bookmarks": cards,
                "total": app.bookmarks.len(),
                "revision": app.bookmarks.revision(),
            }))
        }
        "bookmark.suggest_title" => {
            let url = required(params, "url")?;
            Ok(json!({"title": link_preview::suggest_title(url)}))
        }

        // ─── Filter ───
        "filter.search" => {
            app.set_search(str_param(params, "query").unwrap_or(""));
            Ok(filter_state(app))
        }
        "filter.toggle_tag" => {
            app.toggle_tag(required(params, "tag")?);
            Ok(filter_state(app))
        }
        "filter.clear" => {
            app.clear_filters();
            Ok(filter_state(app))
        }
        "filter.state" => Ok(filter_state(app)),
        "tags.list" => {
            let tags: Vec<Value> = app
                .all_tags()
                .into_iter()
                .map(|tag| {
                    let selected = app.filter.is_tag_selected(&tag);
                    json!({"tag": tag, "selected": selected})
                })
                .collect();
            Ok(json!(tags))
        }

        // ─── Auth ───
        "auth.sign_in" => {
            let url = app.begin_sign_in().map_err(|e| e.to_string())?;
            Ok(json!({"authorization_url": url}))
        }
        "auth.token_response" => {
            let response: TokenResponse =
                serde_json::from_value(params.clone()).map_err(|e| format!("invalid token response: {}", e))?;
            let state = str_param(params, "state").map(str::to_string);
            app.complete_sign_in(response, state.as_deref())
                .await
                .map_err(|e| e.to_string())?;
            Ok(session_status(app))
        }
        "auth.sign_out" => {
            let signed_out = app.sign_out();
            Ok(json!({"ok": signed_out}))
        }
        "auth.status" => Ok(session_status(app)),

        // ─── Sync ───
        "sync.now" => {
            let outcome = app.sync_now().await.map_err(|e| e.to_string())?;
            serde_json::to_value(outcome).map_err(|e| e.to_string())
        }
        "sync.pull" => {
            if app.sync_bridge().is_none() {
                return Err("Cloud sync is disabled".to_string());
            }
            if !app.session.is_signed_in() {
                return Err("Please sign in to sync bookmarks".to_string());
            }
            match app.pull_from_cloud().await {
                Some(outcome) => serde_json::to_value(outcome).map_err(|e| e.to_string()),
                None => Err("Failed to load bookmarks from cloud".to_string()),
            }
        }

        // ─── Settings ───
        "settings.get" => serde_json::to_value(&app.settings).map_err(|e| e.to_string()),
        "settings.set" => {
            let key = required(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            app.set_setting(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "settings.reset" => {
            app.reset_settings().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Notifications ───
        "notifications.drain" => {
            app.poll_sync_events();
            let notifications = app.notifications.drain();
            serde_json::to_value(notifications).map_err(|e| e.to_string())
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
