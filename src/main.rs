//! BookmarkPro — bookmark library with optional cloud sync.
//!
//! Entry point for the console demo. The UI talks to the `bookmarkpro-rpc`
//! binary instead; this walks the core components against in-memory storage
//! and an in-process cloud store.

use std::sync::Arc;

use async_trait::async_trait;
use bookmarkpro::app::App;
use bookmarkpro::database::connection::Database;
use bookmarkpro::database::kv_store::{KeyValueStore, SqliteKeyValueStore};
use bookmarkpro::managers::bookmark_manager::BookmarkManagerTrait;
use bookmarkpro::services::cloud_store::{CloudDocumentStore, MemoryDocumentStore};
use bookmarkpro::services::identity::ProfileClient;
use bookmarkpro::services::link_preview;
use bookmarkpro::types::bookmark::BookmarkDraft;
use bookmarkpro::types::errors::SessionError;
use bookmarkpro::types::session::{TokenResponse, UserProfile};
use bookmarkpro::types::settings::AppSettings;

struct DemoProfiles;

#[async_trait]
impl ProfileClient for DemoProfiles {
    async fn fetch_profile(&self, _access_token: &str) -> Result<UserProfile, SessionError> {
        Ok(UserProfile {
            name: "Demo User".to_string(),
            email: "demo@example.com".to_string(),
            picture: String::new(),
        })
    }
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📦 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn print_visible(app: &App) {
    for bookmark in app.visible().iter() {
        println!(
            "    • {} <{}> [{}] {}",
            bookmark.title,
            bookmark.url,
            bookmark.tags.join(", "),
            link_preview::display_date(&bookmark.date_added)
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!();
    println!("  BookmarkPro v{} — Demo Mode", env!("CARGO_PKG_VERSION"));
    println!();

    let db = Database::open_in_memory().expect("Failed to open database");
    let kv: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(db));
    let cloud = Arc::new(MemoryDocumentStore::new());
    let cloud_store: Arc<dyn CloudDocumentStore> = cloud.clone();

    let mut app = App::new(AppSettings::default(), kv, Some(cloud_store), Arc::new(DemoProfiles))
        .expect("Failed to initialize BookmarkPro");

    section("Startup");
    app.startup().await;
    println!("  Loaded {} bookmarks (sample data seeded on first run)", app.bookmarks.len());
    print_visible(&app);
    println!();

    section("Bookmark Store");
    let added = app
        .add_bookmark(
            BookmarkDraft::new("https://doc.rust-lang.org/book/", "The Rust Book")
                .with_description("The Rust Programming Language")
                .with_tags(["Rust", "docs", "learning"]),
        )
        .expect("add failed");
    println!("  Added: {} (id {})", added.title, added.id);
    match app.add_bookmark(BookmarkDraft::new("https://github.com", "GitHub again")) {
        Ok(_) => println!("  ✗ duplicate was accepted"),
        Err(e) => println!("  Duplicate rejected: {}", e),
    }
    println!(
        "  Suggested title for https://example.com/my-cool_page: {:?}",
        link_preview::suggest_title("https://example.com/my-cool_page")
    );
    println!();

    section("Filter Engine");
    app.set_search("rust");
    println!("  search = \"rust\": {} match(es)", app.visible().len());
    app.clear_filters();
    app.toggle_tag("development");
    println!("  tag = development: {} match(es)", app.visible().len());
    print_visible(&app);
    app.clear_filters();
    println!("  All tags: {}", app.all_tags().join(", "));
    println!();

    section("Session + Cloud Sync");
    let url = app.begin_sign_in().expect("sign-in could not start");
    println!("  Authorization URL: {}", url);
    let user = app
        .complete_sign_in(TokenResponse::granted("demo-token"), None)
        .await
        .expect("sign-in failed");
    println!("  Signed in as {} <{}>", user.name, user.email);

    let outcome = app.sync_now().await.expect("sync failed");
    println!("  Push: {:?}", outcome);
    println!("  Remote document writes: {}", cloud.write_count());

    if let Some(first) = app.bookmarks.bookmarks().first().map(|b| b.id.clone()) {
        app.delete_bookmark(&first);
    }
    tokio::task::yield_now().await;
    for event in app.poll_sync_events() {
        println!("  Background: {:?}", event);
    }

    app.sign_out();
    println!();

    section("Notifications");
    for notification in app.notifications.drain() {
        println!("  [{:?}] {}", notification.kind, notification.message);
    }

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("  ✅ Demo complete");
    println!("═══════════════════════════════════════════════════════════════");
}
