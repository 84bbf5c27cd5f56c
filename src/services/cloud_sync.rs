//! Cloud Sync Bridge for BookmarkPro.
//!
//! Pushes the whole collection as one JSON document to the account's private
//! app-data area and pulls it back on sign-in. Push and pull never overlap:
//! both hold the bridge lock. Scheduled pushes are numbered; a push that gets
//! the lock after a newer one was scheduled is skipped, so the remote copy
//! always ends on the latest local state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use zeroize::Zeroizing;

use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::services::cloud_store::CloudDocumentStore;
use crate::types::bookmark::{normalize_tags, Bookmark};
use crate::types::errors::SyncError;
use crate::types::settings::{ReconcilePolicy, SyncSettings};
use crate::types::sync::{PushOutcome, ReconcileOutcome, SyncEvent};

struct BridgeInner {
    store: Arc<dyn CloudDocumentStore>,
    document_name: String,
    lock: Mutex<()>,
    generation: AtomicU64,
    events: mpsc::UnboundedSender<SyncEvent>,
}

impl BridgeInner {
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn push_generation(
        &self,
        generation: u64,
        token: &str,
        records: &[Bookmark],
    ) -> Result<PushOutcome, SyncError> {
        let _guard = self.lock.lock().await;

        let latest = self.generation.load(Ordering::SeqCst);
        if generation < latest {
            tracing::debug!(generation, latest, "Skipping superseded push");
            return Ok(PushOutcome::Superseded);
        }

        let content = serde_json::to_string_pretty(records)
            .map_err(|e| SyncError::SerializationError(e.to_string()))?;
        let count = records.len();

        match self.store.find_document(token, &self.document_name).await? {
            Some(document_id) => {
                self.store.update_document(token, &document_id, &content).await?;
                tracing::info!(%document_id, count, "Updated cloud bookmarks");
                Ok(PushOutcome::Updated { document_id, count })
            }
            None => {
                let document_id = self
                    .store
                    .create_document(token, &self.document_name, &content)
                    .await?;
                tracing::info!(%document_id, count, "Created cloud bookmarks");
                Ok(PushOutcome::Created { document_id, count })
            }
        }
    }
}

pub struct CloudSyncBridge {
    inner: Arc<BridgeInner>,
    policy: ReconcilePolicy,
    events: mpsc::UnboundedReceiver<SyncEvent>,
}

impl CloudSyncBridge {
    pub fn new(store: Arc<dyn CloudDocumentStore>, settings: &SyncSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(BridgeInner {
                store,
                document_name: settings.document_name.clone(),
                lock: Mutex::new(()),
                generation: AtomicU64::new(0),
                events: tx,
            }),
            policy: settings.policy,
            events: rx,
        }
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    pub fn document_name(&self) -> &str {
        &self.inner.document_name
    }

    /// Pushes now and waits for the result. Counts as the newest push, so
    /// any scheduled push still waiting for the lock is skipped.
    pub async fn push(&self, token: &str, records: &[Bookmark]) -> Result<PushOutcome, SyncError> {
        let generation = self.inner.next_generation();
        self.inner.push_generation(generation, token, records).await
    }

    /// Fire-and-forget push. The outcome arrives as a [`SyncEvent`]; see
    /// [`CloudSyncBridge::drain_events`]. Returns `None` when called outside
    /// a Tokio runtime.
    pub fn schedule_push(&self, token: &str, records: Vec<Bookmark>) -> Option<JoinHandle<()>> {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("No async runtime, skipping scheduled push");
                return None;
            }
        };

        let generation = self.inner.next_generation();
        let inner = Arc::clone(&self.inner);
        let token = Zeroizing::new(token.to_string());

        Some(handle.spawn(async move {
            let event = match inner.push_generation(generation, &token, &records).await {
                Ok(outcome) => SyncEvent::Pushed { generation, outcome },
                Err(e) => {
                    tracing::error!(generation, error = %e, "Error saving to cloud");
                    SyncEvent::PushFailed {
                        generation,
                        error: e.to_string(),
                    }
                }
            };
            // The receiver only goes away with the bridge.
            let _ = inner.events.send(event);
        }))
    }

    /// Reads the remote document. `None` when it is missing, blank or an
    /// empty array.
    pub async fn pull(&self, token: &str) -> Result<Option<Value>, SyncError> {
        let _guard = self.inner.lock.lock().await;

        let Some(document_id) = self
            .inner
            .store
            .find_document(token, &self.inner.document_name)
            .await?
        else {
            tracing::info!("No cloud bookmarks yet");
            return Ok(None);
        };

        let content = self.inner.store.read_document(token, &document_id).await?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let document: Value = serde_json::from_str(&content)
            .map_err(|e| SyncError::InvalidDocument(e.to_string()))?;
        if document.as_array().is_some_and(|a| a.is_empty()) {
            return Ok(None);
        }
        Ok(Some(document))
    }

    /// Applies a pulled document to the store using the configured policy.
    pub fn reconcile(&self, store: &mut BookmarkManager, document: Value) -> ReconcileOutcome {
        match self.policy {
            ReconcilePolicy::Merge => {
                let added = store.merge_from(decode_lenient(document));
                tracing::info!(added, "Merged cloud bookmarks");
                ReconcileOutcome::Merged { added }
            }
            ReconcilePolicy::Replace => {
                let records = serde_json::from_value::<Vec<Bookmark>>(document).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Cloud document is not a bookmark list, clearing");
                    Vec::new()
                });
                store.replace_all(records.into_iter().filter_map(sanitize_remote).collect());
                let count = store.len();
                tracing::info!(count, "Replaced bookmarks from cloud");
                ReconcileOutcome::Replaced { count }
            }
        }
    }

    /// Pull followed by reconcile.
    pub async fn pull_and_reconcile(
        &self,
        token: &str,
        store: &mut BookmarkManager,
    ) -> Result<ReconcileOutcome, SyncError> {
        match self.pull(token).await? {
            Some(document) => Ok(self.reconcile(store, document)),
            None => Ok(ReconcileOutcome::NoRemote),
        }
    }

    /// Completed scheduled pushes since the last call.
    pub fn drain_events(&mut self) -> Vec<SyncEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }
}

/// Decodes each array element on its own, skipping the ones that are not
/// bookmarks.
fn decode_lenient(document: Value) -> Vec<Bookmark> {
    let Value::Array(items) = document else {
        tracing::warn!("Cloud document is not an array, nothing to merge");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Bookmark>(item) {
            Ok(bookmark) => sanitize_remote(bookmark),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed cloud bookmark");
                None
            }
        })
        .collect()
}

/// Holds a remote record to the rules local edits follow: an absolute URL, a
/// non-empty title and normalized tags. Records that fail are dropped.
fn sanitize_remote(mut bookmark: Bookmark) -> Option<Bookmark> {
    let url = bookmark.url.trim();
    if Url::parse(url).is_err() {
        tracing::warn!(url = %bookmark.url, "Skipping cloud bookmark with invalid URL");
        return None;
    }
    if bookmark.title.trim().is_empty() {
        tracing::warn!(url = %bookmark.url, "Skipping cloud bookmark without a title");
        return None;
    }
    bookmark.url = url.to_string();
    bookmark.title = bookmark.title.trim().to_string();
    bookmark.tags = normalize_tags(&bookmark.tags);
    Some(bookmark)
}
