//! Persistence Adapter for BookmarkPro.
//!
//! Reads and writes the bookmark collection through a [`KeyValueStore`].
//! Every failure here is soft: reads degrade to an empty collection and
//! writes are logged and dropped, so callers never see a storage error.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::database::kv_store::{KeyValueStore, KEY_BOOKMARKS, KEY_INITIALIZED};
use crate::types::bookmark::Bookmark;

/// Serializes the bookmark collection to durable storage.
#[derive(Clone)]
pub struct PersistenceAdapter {
    kv: Arc<dyn KeyValueStore>,
    seed_sample_data: bool,
}

impl PersistenceAdapter {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            seed_sample_data: true,
        }
    }

    /// Disables the one-time demo content.
    pub fn without_sample_data(mut self) -> Self {
        self.seed_sample_data = false;
        self
    }

    /// Reads the stored collection. Missing, unreadable or malformed data
    /// yields an empty collection.
    pub fn load(&self) -> Vec<Bookmark> {
        let raw = match self.kv.get(KEY_BOOKMARKS) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!(error = %e, "Error loading bookmarks");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(bookmarks) => bookmarks,
            Err(e) => {
                tracing::error!(error = %e, "Stored bookmarks are corrupted, starting empty");
                Vec::new()
            }
        }
    }

    /// Overwrites the stored collection. Returns false if the write was
    /// dropped; the in-memory state stays authoritative for this cycle.
    pub fn save(&self, bookmarks: &[Bookmark]) -> bool {
        let json = match serde_json::to_string(bookmarks) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Error serializing bookmarks");
                return false;
            }
        };

        match self.kv.set(KEY_BOOKMARKS, &json) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Error saving bookmarks");
                false
            }
        }
    }

    /// Whether demo content has ever been seeded on this installation.
    pub fn is_seeded(&self) -> bool {
        matches!(self.kv.get(KEY_INITIALIZED), Ok(Some(v)) if v == "true")
    }

    fn mark_seeded(&self) {
        if let Err(e) = self.kv.set(KEY_INITIALIZED, "true") {
            tracing::error!(error = %e, "Error recording seeded flag");
        }
    }

    /// Loads the collection, seeding the sample bookmarks the first time the
    /// store is ever empty. Emptying the library later does not reseed.
    pub fn initialize(&self) -> Vec<Bookmark> {
        let bookmarks = self.load();
        if !bookmarks.is_empty() || !self.seed_sample_data || self.is_seeded() {
            return bookmarks;
        }

        let samples = sample_bookmarks();
        self.save(&samples);
        self.mark_seeded();
        tracing::info!(count = samples.len(), "Seeded sample bookmarks");
        samples
    }
}

/// Demo content shown on first launch.
pub fn sample_bookmarks() -> Vec<Bookmark> {
    let at = |month: u32, day: u32, hour: u32, min: u32| -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, hour, min, 0)
            .single()
            .unwrap_or_default()
    };
    let entry = |title: &str, url: &str, description: &str, tags: &[&str], date_added| Bookmark {
        id: Uuid::new_v4().to_string(),
        url: url.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        date_added,
    };

    vec![
        entry(
            "Raindrop.io",
            "https://raindrop.io",
            "All-in-one bookmark manager with tagging and search",
            &["productivity", "bookmarks", "tools"],
            at(8, 1, 12, 0),
        ),
        entry(
            "GitHub",
            "https://github.com",
            "Code hosting platform for version control and collaboration",
            &["development", "git", "coding"],
            at(8, 1, 11, 30),
        ),
        entry(
            "CSS Grid Guide",
            "https://css-tricks.com/snippets/css/complete-guide-grid/",
            "Complete guide to CSS Grid layout system",
            &["css", "web design", "frontend", "tutorial"],
            at(7, 31, 14, 20),
        ),
    ]
}
