//! BookmarkPro RPC Server — JSON-RPC over stdin/stdout for the UI shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"url":"...","title":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Events:   {"event":"ready"|"notification"|"state_changed", ...}
//!
//! Logs go to stderr; stdout carries only protocol lines.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use bookmarkpro::app::App;
use bookmarkpro::rpc_handler::handle_method;
use bookmarkpro::services::settings_engine::SettingsEngine;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn emit(line: &Value) {
    let mut out = io::stdout().lock();
    if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
        tracing::error!("stdout closed");
    }
}

/// Emits `state_changed` when the collection moved and one `notification`
/// event per pending message.
fn emit_events(app: &mut App, last_revision: &mut u64) {
    app.poll_sync_events();

    let revision = app.bookmarks.revision();
    if revision != *last_revision {
        *last_revision = revision;
        emit(&json!({"event": "state_changed", "revision": revision, "total": app.bookmarks.len()}));
    }

    for notification in app.notifications.drain() {
        emit(&json!({"event": "notification", "notification": notification}));
    }
}

/// Logs to stderr. `BOOKMARKPRO_LOG_FORMAT=json` switches to JSON lines.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr);

    if std::env::var("BOOKMARKPRO_LOG_FORMAT").is_ok_and(|f| f == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() {
    init_logging();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start async runtime");
            std::process::exit(1);
        }
    };

    runtime.block_on(serve());
}

async fn serve() {
    let mut settings_engine = SettingsEngine::new(None);
    let settings = settings_engine.load_or_default();
    let max_per_second = settings.rpc.max_requests_per_second;

    let mut app = match App::open(settings) {
        Ok(app) => app.with_settings_engine(settings_engine),
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize BookmarkPro");
            std::process::exit(1);
        }
    };
    app.startup().await;

    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));
    let mut last_revision = 0;
    emit_events(&mut app, &mut last_revision);

    let mut rate_limiter = RateLimiter::new(max_per_second);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(Duration::from_millis(500));

    loop {
        let line = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "stdin read failed");
                    break;
                }
            },
            _ = tick.tick() => {
                emit_events(&mut app, &mut last_revision);
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            tracing::warn!("Rate limit exceeded");
            emit(&json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));
        tracing::debug!(method, "Request");

        let response = match handle_method(&mut app, method, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        emit(&response);
        emit_events(&mut app, &mut last_revision);
    }

    tracing::info!("stdin closed, shutting down");
}
