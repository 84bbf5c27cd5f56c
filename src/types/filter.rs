use serde::{Deserialize, Serialize};

/// Transient filter selection: free-text search plus an AND-set of tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub tags: Vec<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when either search text or a tag is selected.
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || !self.tags.is_empty()
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Adds the tag if absent, removes it if present. Two toggles of the same
    /// tag cancel out.
    pub fn toggle_tag(&mut self, tag: &str) {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return;
        }
        match self.tags.iter().position(|t| *t == tag) {
            Some(index) => {
                self.tags.remove(index);
            }
            None => self.tags.push(tag),
        }
    }

    pub fn is_tag_selected(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn clear(&mut self) {
        self.search.clear();
        self.tags.clear();
    }
}
