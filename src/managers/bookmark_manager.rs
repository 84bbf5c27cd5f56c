//! Bookmark Manager for BookmarkPro.
//!
//! Owns the ordered in-memory collection (most recent first) and the
//! unique-URL invariant. Every mutation is written through the
//! [`PersistenceAdapter`] and bumps a revision counter observers can watch.

use chrono::Utc;
use reqwest::Url;
use tokio::sync::watch;
use uuid::Uuid;

use crate::services::persistence::PersistenceAdapter;
use crate::types::bookmark::{normalize_tags, Bookmark, BookmarkDraft, BookmarkPatch};
use crate::types::errors::BookmarkError;

/// Trait defining bookmark store operations.
pub trait BookmarkManagerTrait {
    fn add(&mut self, draft: BookmarkDraft) -> Result<Bookmark, BookmarkError>;
    /// Returns `Ok(None)` when no bookmark has this id.
    fn update(&mut self, id: &str, patch: BookmarkPatch) -> Result<Option<Bookmark>, BookmarkError>;
    fn delete(&mut self, id: &str) -> Option<Bookmark>;
    fn replace_all(&mut self, records: Vec<Bookmark>);
    /// Prepends records whose URL is not present yet. Returns how many were added.
    fn merge_from(&mut self, records: Vec<Bookmark>) -> usize;
    fn bookmarks(&self) -> &[Bookmark];
    fn get(&self, id: &str) -> Option<&Bookmark>;
}

/// In-memory bookmark collection with write-through persistence.
pub struct BookmarkManager {
    bookmarks: Vec<Bookmark>,
    persistence: PersistenceAdapter,
    revision: watch::Sender<u64>,
}

impl BookmarkManager {
    /// Creates an empty manager. Call [`BookmarkManager::load`] to read the
    /// stored collection.
    pub fn new(persistence: PersistenceAdapter) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            bookmarks: Vec::new(),
            persistence,
            revision,
        }
    }

    /// Replaces the in-memory collection with the stored one, seeding sample
    /// data on first run. Returns the number of bookmarks loaded.
    pub fn load(&mut self) -> usize {
        self.bookmarks = self.persistence.initialize();
        self.bump();
        self.bookmarks.len()
    }

    /// Subscribes to state changes. The value is a monotonically increasing
    /// revision number.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn find_by_url(&self, url: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.url == url)
    }

    /// True if a bookmark other than `except_id` already uses `url`.
    fn url_taken(&self, url: &str, except_id: Option<&str>) -> bool {
        self.bookmarks
            .iter()
            .any(|b| b.url == url && Some(b.id.as_str()) != except_id)
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// Persists and notifies observers.
    fn commit(&self) {
        self.persistence.save(&self.bookmarks);
        self.bump();
    }
}

fn validate_url(url: &str) -> Result<String, BookmarkError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(BookmarkError::EmptyUrl);
    }
    Url::parse(url).map_err(|_| BookmarkError::InvalidUrl(url.to_string()))?;
    Ok(url.to_string())
}

fn validate_title(title: &str) -> Result<String, BookmarkError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(BookmarkError::EmptyTitle);
    }
    Ok(title.to_string())
}

/// Keeps the first record for each URL.
fn dedupe_by_url(records: Vec<Bookmark>) -> Vec<Bookmark> {
    let mut out: Vec<Bookmark> = Vec::with_capacity(records.len());
    for record in records {
        if out.iter().any(|b| b.url == record.url) {
            tracing::warn!(url = %record.url, "Dropping duplicate bookmark URL");
            continue;
        }
        out.push(record);
    }
    out
}

impl BookmarkManagerTrait for BookmarkManager {
    /// Validates the draft and inserts it at the front.
    fn add(&mut self, draft: BookmarkDraft) -> Result<Bookmark, BookmarkError> {
        let url = validate_url(&draft.url)?;
        let title = validate_title(&draft.title)?;
        if self.url_taken(&url, None) {
            return Err(BookmarkError::DuplicateUrl(url));
        }

        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            url,
            title,
            description: draft.description.trim().to_string(),
            tags: normalize_tags(&draft.tags),
            date_added: Utc::now(),
        };

        self.bookmarks.insert(0, bookmark.clone());
        self.commit();
        tracing::debug!(id = %bookmark.id, "Bookmark added");
        Ok(bookmark)
    }

    /// Merges the supplied fields into the bookmark. `id` and `date_added`
    /// never change.
    fn update(&mut self, id: &str, patch: BookmarkPatch) -> Result<Option<Bookmark>, BookmarkError> {
        let Some(index) = self.bookmarks.iter().position(|b| b.id == id) else {
            return Ok(None);
        };

        let url = patch.url.as_deref().map(validate_url).transpose()?;
        let title = patch.title.as_deref().map(validate_title).transpose()?;
        if let Some(url) = &url {
            if self.url_taken(url, Some(id)) {
                return Err(BookmarkError::DuplicateUrl(url.clone()));
            }
        }

        let bookmark = &mut self.bookmarks[index];
        if let Some(url) = url {
            bookmark.url = url;
        }
        if let Some(title) = title {
            bookmark.title = title;
        }
        if let Some(description) = patch.description {
            bookmark.description = description.trim().to_string();
        }
        if let Some(tags) = patch.tags {
            bookmark.tags = normalize_tags(&tags);
        }
        let updated = bookmark.clone();

        self.commit();
        Ok(Some(updated))
    }

    fn delete(&mut self, id: &str) -> Option<Bookmark> {
        let index = self.bookmarks.iter().position(|b| b.id == id)?;
        let removed = self.bookmarks.remove(index);
        self.commit();
        Some(removed)
    }

    /// Wholesale overwrite. Only the remote-authoritative pull uses this.
    fn replace_all(&mut self, records: Vec<Bookmark>) {
        self.bookmarks = dedupe_by_url(records);
        self.commit();
    }

    fn merge_from(&mut self, records: Vec<Bookmark>) -> usize {
        let mut incoming: Vec<Bookmark> = Vec::new();
        for record in records {
            let known = self.url_taken(&record.url, None) || incoming.iter().any(|b| b.url == record.url);
            if !known {
                incoming.push(record);
            }
        }

        let added = incoming.len();
        if added > 0 {
            incoming.append(&mut self.bookmarks);
            self.bookmarks = incoming;
            self.commit();
        }
        added
    }

    fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    fn get(&self, id: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.id == id)
    }
}
