//! Filter Engine for BookmarkPro.
//!
//! A pure function of (bookmarks, filter state). Results keep the store's
//! order; with no active filter the store slice is handed back unchanged.

use std::collections::BTreeSet;

use crate::types::bookmark::Bookmark;
use crate::types::filter::FilterState;

/// The visible set of bookmarks.
#[derive(Debug, Clone)]
pub enum FilteredView<'a> {
    /// No filter is active: the whole store, in store order.
    All(&'a [Bookmark]),
    /// Matching bookmarks, in store order.
    Matches(Vec<&'a Bookmark>),
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        match self {
            FilteredView::All(all) => all.len(),
            FilteredView::Matches(matches) => matches.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, FilteredView::Matches(_))
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = &'a Bookmark> + '_> {
        match self {
            FilteredView::All(all) => Box::new((*all).iter()),
            FilteredView::Matches(matches) => Box::new(matches.iter().copied()),
        }
    }

    pub fn ids(&self) -> Vec<&'a str> {
        self.iter().map(|b| b.id.as_str()).collect()
    }
}

/// Case-insensitive substring match against title, description, url or any tag.
/// An empty query matches everything.
pub fn matches_search(bookmark: &Bookmark, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    bookmark.title.to_lowercase().contains(&needle)
        || bookmark.description.to_lowercase().contains(&needle)
        || bookmark.url.to_lowercase().contains(&needle)
        || bookmark.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

/// True if the bookmark carries every selected tag.
pub fn matches_tags(bookmark: &Bookmark, selected: &[String]) -> bool {
    selected.iter().all(|tag| bookmark.has_tag(tag))
}

pub fn matches(bookmark: &Bookmark, state: &FilterState) -> bool {
    matches_search(bookmark, &state.search) && matches_tags(bookmark, &state.tags)
}

/// Derives the visible view.
pub fn filter<'a>(bookmarks: &'a [Bookmark], state: &FilterState) -> FilteredView<'a> {
    if !state.is_active() {
        return FilteredView::All(bookmarks);
    }
    FilteredView::Matches(bookmarks.iter().filter(|b| matches(b, state)).collect())
}

/// Sorted, de-duplicated tag catalogue across all bookmarks.
pub fn all_tags(bookmarks: &[Bookmark]) -> Vec<String> {
    bookmarks
        .iter()
        .flat_map(|b| b.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
