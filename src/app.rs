//! App Core for BookmarkPro.
//!
//! Assembles the store, session, filter state, notifications and the optional
//! cloud sync bridge, and runs the cross-component flows: write-through plus
//! auto-push after every mutation, and a pull after every sign-in.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::database::connection::Database;
use crate::database::kv_store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::session_manager::SessionManager;
use crate::services::cloud_store::CloudDocumentStore;
use crate::services::cloud_sync::CloudSyncBridge;
use crate::services::drive_client::DriveDocumentStore;
use crate::services::filter_engine::{self, FilteredView};
use crate::services::identity::{self, HttpProfileClient, ProfileClient};
use crate::services::notification_center::NotificationCenter;
use crate::services::persistence::PersistenceAdapter;
use crate::services::settings_engine::{self, SettingsEngine, SettingsEngineTrait};
use crate::types::bookmark::{Bookmark, BookmarkDraft, BookmarkPatch};
use crate::types::errors::{BookmarkError, SessionError, SettingsError, SyncError};
use crate::types::filter::FilterState;
use crate::types::session::{TokenResponse, UserProfile};
use crate::types::settings::AppSettings;
use crate::types::sync::{PushOutcome, ReconcileOutcome, SyncEvent};

/// Central application struct holding every component.
pub struct App {
    pub settings: AppSettings,
    pub bookmarks: BookmarkManager,
    pub session: SessionManager,
    pub filter: FilterState,
    pub notifications: NotificationCenter,
    sync: Option<CloudSyncBridge>,
    cloud: Option<Arc<dyn CloudDocumentStore>>,
    settings_engine: Option<SettingsEngine>,
    profiles: Arc<dyn ProfileClient>,
    pending_auth_state: Option<String>,
}

impl App {
    /// Builds the app from explicit parts. `cloud` is ignored when sync is
    /// disabled in `settings`.
    pub fn new(
        settings: AppSettings,
        kv: Arc<dyn KeyValueStore>,
        cloud: Option<Arc<dyn CloudDocumentStore>>,
        profiles: Arc<dyn ProfileClient>,
    ) -> Result<Self, SessionError> {
        let mut persistence = PersistenceAdapter::new(kv.clone());
        if !settings.library.seed_sample_data {
            persistence = persistence.without_sample_data();
        }

        let sync = build_bridge(cloud.as_ref(), &settings);

        Ok(Self {
            bookmarks: BookmarkManager::new(persistence),
            session: SessionManager::new(kv)?,
            filter: FilterState::new(),
            notifications: NotificationCenter::new(Duration::from_millis(
                settings.notifications.dismiss_after_ms,
            )),
            sync,
            cloud,
            settings_engine: None,
            profiles,
            pending_auth_state: None,
            settings,
        })
    }

    /// Builds the production app: SQLite storage in the data directory
    /// (in-memory if it cannot be opened), Drive for sync.
    pub fn open(settings: AppSettings) -> Result<Self, SessionError> {
        let db_path = settings_engine::database_path(&settings);
        let kv: Arc<dyn KeyValueStore> = match Database::open(&db_path) {
            Ok(db) => Arc::new(SqliteKeyValueStore::new(db)),
            Err(e) => {
                tracing::warn!(path = %db_path.display(), error = %e, "Falling back to in-memory storage");
                Arc::new(MemoryKeyValueStore::new())
            }
        };

        let http = reqwest::Client::new();
        let cloud: Arc<dyn CloudDocumentStore> =
            Arc::new(DriveDocumentStore::new(http.clone(), &settings.drive));
        let profiles = Arc::new(HttpProfileClient::new(http, settings.identity.userinfo_url.clone()));

        Self::new(settings, kv, Some(cloud), profiles)
    }

    /// Attaches the settings file that `set_setting` and `reset_settings`
    /// write to.
    pub fn with_settings_engine(mut self, engine: SettingsEngine) -> Self {
        self.settings_engine = Some(engine);
        self
    }

    pub fn sync_bridge(&self) -> Option<&CloudSyncBridge> {
        self.sync.as_ref()
    }

    /// Startup sequence: load (seeding once), restore the durable session,
    /// and pull from the cloud if a session came back.
    pub async fn startup(&mut self) {
        let count = self.bookmarks.load();
        tracing::info!(count, "Bookmarks loaded");

        if self.session.restore() {
            self.pull_from_cloud().await;
        }
    }

    // === Settings ===

    /// Updates one setting by dot-notation key and saves the file. `sync.*`
    /// and `notifications.*` take effect at once; the rest on next start.
    pub fn set_setting(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        let engine = self.settings_engine.as_mut().ok_or(SettingsError::NotAttached)?;
        engine.set_value(key, value)?;
        let settings = engine.get_settings().clone();
        self.apply_settings(settings);
        Ok(())
    }

    pub fn reset_settings(&mut self) -> Result<(), SettingsError> {
        let engine = self.settings_engine.as_mut().ok_or(SettingsError::NotAttached)?;
        engine.reset()?;
        let settings = engine.get_settings().clone();
        self.apply_settings(settings);
        Ok(())
    }

    fn apply_settings(&mut self, settings: AppSettings) {
        let sync_changed = settings.sync != self.settings.sync;
        self.notifications
            .set_dismiss_after(Duration::from_millis(settings.notifications.dismiss_after_ms));
        self.settings = settings;

        if sync_changed {
            // Events of the outgoing bridge would be lost with it.
            self.poll_sync_events();
            self.sync = build_bridge(self.cloud.as_ref(), &self.settings);
            tracing::info!(enabled = self.sync.is_some(), "Sync settings applied");
        }
    }

    // === Bookmarks ===

    pub fn add_bookmark(&mut self, draft: BookmarkDraft) -> Result<Bookmark, BookmarkError> {
        let bookmark = self.bookmarks.add(draft)?;
        self.after_mutation();
        Ok(bookmark)
    }

    pub fn update_bookmark(
        &mut self,
        id: &str,
        patch: BookmarkPatch,
    ) -> Result<Option<Bookmark>, BookmarkError> {
        let updated = self.bookmarks.update(id, patch)?;
        if updated.is_some() {
            self.after_mutation();
        }
        Ok(updated)
    }

    pub fn delete_bookmark(&mut self, id: &str) -> Option<Bookmark> {
        let removed = self.bookmarks.delete(id);
        if removed.is_some() {
            self.after_mutation();
        }
        removed
    }

    /// Schedules a push of the full collection when signed in and
    /// auto-push is on.
    fn after_mutation(&mut self) {
        if !self.settings.sync.auto_push {
            return;
        }
        let (Some(bridge), Some(token)) = (self.sync.as_ref(), self.session.access_token()) else {
            return;
        };
        bridge.schedule_push(token, self.bookmarks.bookmarks().to_vec());
    }

    // === Filtering ===

    pub fn set_search(&mut self, search: &str) {
        self.filter.set_search(search);
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        self.filter.toggle_tag(tag);
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
    }

    /// The bookmarks the UI should show right now.
    pub fn visible(&self) -> FilteredView<'_> {
        filter_engine::filter(self.bookmarks.bookmarks(), &self.filter)
    }

    pub fn all_tags(&self) -> Vec<String> {
        filter_engine::all_tags(self.bookmarks.bookmarks())
    }

    // === Session ===

    /// Starts an interactive sign-in and returns the URL to open.
    pub fn begin_sign_in(&mut self) -> Result<String, SessionError> {
        self.session.begin_sign_in()?;

        let state = Uuid::new_v4().to_string();
        match identity::authorization_url(&self.settings.identity, &state) {
            Ok(url) => {
                self.pending_auth_state = Some(state);
                Ok(url)
            }
            Err(e) => {
                self.session.sign_out();
                Err(e)
            }
        }
    }

    /// Handles the token callback. `state` must echo the value embedded in
    /// the authorization URL when one is supplied.
    pub async fn complete_sign_in(
        &mut self,
        response: TokenResponse,
        state: Option<&str>,
    ) -> Result<UserProfile, SessionError> {
        let expected = self.pending_auth_state.take();
        if let (Some(expected), Some(got)) = (expected.as_deref(), state) {
            if expected != got {
                self.session.sign_out();
                self.notifications.error("Sign-in failed");
                return Err(SessionError::AuthFailed("state mismatch".to_string()));
            }
        }

        let user = match self
            .session
            .complete_sign_in(response, self.profiles.as_ref())
            .await
        {
            Ok(user) => user,
            Err(e) => {
                self.notifications.error("Sign-in failed");
                return Err(e);
            }
        };

        tracing::info!(user = %user.email, "Signed in");
        self.pull_from_cloud().await;
        Ok(user)
    }

    pub fn sign_out(&mut self) -> bool {
        self.pending_auth_state = None;
        let dropped = self.session.sign_out();
        if dropped {
            self.notifications.success("Signed out successfully");
        }
        dropped
    }

    // === Sync ===

    /// Pulls and reconciles. Errors notify and leave local state alone.
    pub async fn pull_from_cloud(&mut self) -> Option<ReconcileOutcome> {
        let bridge = self.sync.as_ref()?;
        let token = self.session.access_token()?;

        match bridge.pull_and_reconcile(token, &mut self.bookmarks).await {
            Ok(outcome) => {
                match outcome {
                    ReconcileOutcome::Merged { added } if added > 0 => {
                        self.notifications
                            .success(format!("Merged {} bookmarks from cloud", added));
                    }
                    ReconcileOutcome::Replaced { count } => {
                        self.notifications
                            .success(format!("Loaded {} bookmarks from cloud", count));
                    }
                    _ => {}
                }
                Some(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error loading from cloud");
                self.notifications.error("Failed to load bookmarks from cloud");
                None
            }
        }
    }

    /// Manual "sync now": pushes and waits for the result.
    pub async fn sync_now(&mut self) -> Result<PushOutcome, SyncError> {
        let Some(bridge) = self.sync.as_ref() else {
            return Err(SyncError::Disabled);
        };
        let Some(token) = self.session.access_token() else {
            self.notifications.error("Please sign in to sync bookmarks");
            return Err(SyncError::NotSignedIn);
        };

        self.notifications.info("Syncing bookmarks...");
        match bridge.push(token, self.bookmarks.bookmarks()).await {
            Ok(outcome) => {
                self.notifications.success("Bookmarks synced successfully!");
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, "Sync error");
                self.notifications.error("Failed to sync bookmarks");
                Err(e)
            }
        }
    }

    /// Collects finished background pushes and notifies on failures.
    pub fn poll_sync_events(&mut self) -> Vec<SyncEvent> {
        let Some(bridge) = self.sync.as_mut() else {
            return Vec::new();
        };
        let events = bridge.drain_events();
        for event in &events {
            if let SyncEvent::PushFailed { .. } = event {
                self.notifications.error("Failed to sync bookmarks");
            }
        }
        events
    }
}

fn build_bridge(cloud: Option<&Arc<dyn CloudDocumentStore>>, settings: &AppSettings) -> Option<CloudSyncBridge> {
    match cloud {
        Some(store) if settings.sync.enabled => Some(CloudSyncBridge::new(store.clone(), &settings.sync)),
        _ => None,
    }
}
