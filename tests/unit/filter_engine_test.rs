//! Unit tests for the Filter Engine and FilterState.

use bookmarkpro::services::filter_engine::{all_tags, filter, matches_search, FilteredView};
use bookmarkpro::services::persistence::sample_bookmarks;
use bookmarkpro::types::bookmark::Bookmark;
use bookmarkpro::types::filter::FilterState;
use chrono::Utc;
use rstest::rstest;

fn bookmark(id: &str, title: &str, url: &str, tags: &[&str]) -> Bookmark {
    Bookmark {
        id: id.to_string(),
        url: url.to_string(),
        title: title.to_string(),
        description: format!("About {}", title),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        date_added: Utc::now(),
    }
}

fn library() -> Vec<Bookmark> {
    vec![
        bookmark("1", "Rust Book", "https://doc.rust-lang.org/book/", &["rust", "docs"]),
        bookmark("2", "Tokio", "https://tokio.rs", &["rust", "async"]),
        bookmark("3", "MDN", "https://developer.mozilla.org", &["docs", "web"]),
    ]
}

#[test]
fn test_empty_state_is_identity_view() {
    let bookmarks = library();
    let view = filter(&bookmarks, &FilterState::new());

    assert!(matches!(view, FilteredView::All(_)));
    assert!(!view.is_filtered());
    assert_eq!(view.ids(), vec!["1", "2", "3"]);
}

#[rstest]
#[case::title("tokio", vec!["2"])]
#[case::case_insensitive("RUST BOOK", vec!["1"])]
#[case::url("mozilla", vec!["3"])]
#[case::description("about mdn", vec!["3"])]
#[case::tag("async", vec!["2"])]
#[case::partial_tag("doc", vec!["1", "3"])]
#[case::nothing("python", vec![])]
fn test_search_predicate(#[case] query: &str, #[case] expected: Vec<&str>) {
    let bookmarks = library();
    let mut state = FilterState::new();
    state.set_search(query);

    assert_eq!(filter(&bookmarks, &state).ids(), expected);
}

#[test]
fn test_tags_use_and_semantics() {
    let bookmarks = library();
    let mut state = FilterState::new();

    state.toggle_tag("rust");
    assert_eq!(filter(&bookmarks, &state).ids(), vec!["1", "2"]);

    state.toggle_tag("docs");
    assert_eq!(filter(&bookmarks, &state).ids(), vec!["1"]);

    state.toggle_tag("web");
    assert!(filter(&bookmarks, &state).is_empty());
}

#[test]
fn test_search_and_tags_combine() {
    let bookmarks = library();
    let mut state = FilterState::new();
    state.toggle_tag("docs");
    state.set_search("mdn");

    assert_eq!(filter(&bookmarks, &state).ids(), vec!["3"]);
}

#[test]
fn test_toggle_twice_cancels_out() {
    let mut state = FilterState::new();
    state.toggle_tag("Rust ");
    assert!(state.is_tag_selected("rust"));

    state.toggle_tag("rust");
    assert!(!state.is_tag_selected("rust"));
    assert!(!state.is_active());
}

#[test]
fn test_toggle_ignores_blank_tag() {
    let mut state = FilterState::new();
    state.toggle_tag("   ");
    assert!(state.tags.is_empty());
}

#[test]
fn test_clear_resets_everything() {
    let mut state = FilterState::new();
    state.set_search("x");
    state.toggle_tag("y");
    state.clear();
    assert_eq!(state, FilterState::default());
}

#[test]
fn test_empty_query_matches_anything() {
    let b = bookmark("1", "A", "https://a.example", &[]);
    assert!(matches_search(&b, ""));
}

#[test]
fn test_all_tags_sorted_and_unique() {
    assert_eq!(all_tags(&library()), vec!["async", "docs", "rust", "web"]);
    assert_eq!(
        all_tags(&sample_bookmarks()),
        vec![
            "bookmarks",
            "coding",
            "css",
            "development",
            "frontend",
            "git",
            "productivity",
            "tools",
            "tutorial",
            "web design"
        ]
    );
}
