//! Property-based tests for the Filter Engine.
//!
//! The filtered view is always an order-preserving subsequence of the store,
//! every element independently satisfies both predicates, and toggling a tag
//! twice restores the original filter state.

use bookmarkpro::services::filter_engine::filter;
use bookmarkpro::types::bookmark::Bookmark;
use bookmarkpro::types::filter::FilterState;
use chrono::Utc;
use proptest::prelude::*;

const TAGS: &[&str] = &["rust", "web", "docs", "tools", "css"];

fn arb_bookmark() -> impl Strategy<Value = Bookmark> {
    (
        "[a-z]{3,8}",
        "[A-Za-z ]{1,20}",
        "[a-z ]{0,20}",
        prop::sample::subsequence(TAGS, 0..=3),
    )
        .prop_map(|(host, title, description, tags)| Bookmark {
            id: uuid::Uuid::new_v4().to_string(),
            url: format!("https://{}.example", host),
            title,
            description,
            tags: tags.into_iter().map(str::to_string).collect(),
            date_added: Utc::now(),
        })
}

fn arb_state() -> impl Strategy<Value = FilterState> {
    ("[a-zA-Z]{0,3}", prop::sample::subsequence(TAGS, 0..=2)).prop_map(|(search, tags)| {
        let mut state = FilterState::new();
        state.set_search(search);
        for tag in tags {
            state.toggle_tag(tag);
        }
        state
    })
}

/// Reference predicate written against the literal record.
fn expected_match(b: &Bookmark, state: &FilterState) -> bool {
    let q = state.search.to_lowercase();
    let search_ok = q.is_empty()
        || b.title.to_lowercase().contains(&q)
        || b.description.to_lowercase().contains(&q)
        || b.url.to_lowercase().contains(&q)
        || b.tags.iter().any(|t| t.contains(&q));
    let tags_ok = state.tags.iter().all(|t| b.tags.contains(t));
    search_ok && tags_ok
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn filter_is_ordered_subsequence_of_matches(
        bookmarks in prop::collection::vec(arb_bookmark(), 0..20),
        state in arb_state(),
    ) {
        let view = filter(&bookmarks, &state);

        // Exactly the records the reference predicate accepts, in store order.
        let expected: Vec<&str> = bookmarks
            .iter()
            .filter(|b| expected_match(b, &state))
            .map(|b| b.id.as_str())
            .collect();
        prop_assert_eq!(view.ids(), expected);
    }

    #[test]
    fn inactive_state_yields_identity(bookmarks in prop::collection::vec(arb_bookmark(), 0..20)) {
        let view = filter(&bookmarks, &FilterState::new());
        prop_assert!(!view.is_filtered());
        prop_assert_eq!(view.len(), bookmarks.len());
    }

    #[test]
    fn toggle_twice_is_identity(state in arb_state(), tag in prop::sample::select(TAGS)) {
        let mut toggled = state.clone();
        toggled.toggle_tag(tag);
        toggled.toggle_tag(tag);

        let mut a = toggled.tags.clone();
        let mut b = state.tags.clone();
        a.sort();
        b.sort();
        prop_assert_eq!(a, b);
        prop_assert_eq!(toggled.search, state.search);
    }
}
