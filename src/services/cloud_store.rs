//! Remote document storage contract used by the sync bridge.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::types::errors::SyncError;

/// A per-account private area holding named JSON documents.
#[async_trait]
pub trait CloudDocumentStore: Send + Sync {
    /// Returns the id of the document called `name`, if one exists.
    async fn find_document(&self, token: &str, name: &str) -> Result<Option<String>, SyncError>;
    /// Creates a document and returns its id.
    async fn create_document(&self, token: &str, name: &str, content: &str) -> Result<String, SyncError>;
    /// Replaces the content of an existing document.
    async fn update_document(&self, token: &str, id: &str, content: &str) -> Result<(), SyncError>;
    async fn read_document(&self, token: &str, id: &str) -> Result<String, SyncError>;
}

#[derive(Debug, Clone)]
struct StoredDocument {
    name: String,
    content: String,
}

/// In-process document store for offline use, demos and tests.
///
/// `set_failing(true)` makes every call fail with a network error.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<BTreeMap<String, StoredDocument>>,
    next_id: AtomicUsize,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful create/update calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> usize {
        self.documents.lock().map(|d| d.len()).unwrap_or(0)
    }

    /// Content of the first document called `name`.
    pub fn content_of(&self, name: &str) -> Option<String> {
        let documents = self.documents.lock().ok()?;
        documents
            .values()
            .find(|d| d.name == name)
            .map(|d| d.content.clone())
    }

    /// Stores a document directly, bypassing the failure switch.
    pub fn insert(&self, name: &str, content: &str) -> String {
        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(
                id.clone(),
                StoredDocument {
                    name: name.to_string(),
                    content: content.to_string(),
                },
            );
        }
        id
    }

    fn check(&self) -> Result<(), SyncError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SyncError::NetworkError("connection refused".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, StoredDocument>>, SyncError> {
        self.documents
            .lock()
            .map_err(|e| SyncError::NetworkError(e.to_string()))
    }
}

#[async_trait]
impl CloudDocumentStore for MemoryDocumentStore {
    async fn find_document(&self, _token: &str, name: &str) -> Result<Option<String>, SyncError> {
        self.check()?;
        Ok(self
            .lock()?
            .iter()
            .find(|(_, d)| d.name == name)
            .map(|(id, _)| id.clone()))
    }

    async fn create_document(&self, _token: &str, name: &str, content: &str) -> Result<String, SyncError> {
        self.check()?;
        let id = self.insert(name, content);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn update_document(&self, _token: &str, id: &str, content: &str) -> Result<(), SyncError> {
        self.check()?;
        let mut documents = self.lock()?;
        let document = documents.get_mut(id).ok_or_else(|| SyncError::RemoteError {
            status: 404,
            message: format!("File not found: {}", id),
        })?;
        document.content = content.to_string();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn read_document(&self, _token: &str, id: &str) -> Result<String, SyncError> {
        self.check()?;
        self.lock()?
            .get(id)
            .map(|d| d.content.clone())
            .ok_or_else(|| SyncError::RemoteError {
                status: 404,
                message: format!("File not found: {}", id),
            })
    }
}
