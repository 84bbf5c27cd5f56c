use serde::{Deserialize, Serialize};

/// Top-level application settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub library: LibrarySettings,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub identity: IdentitySettings,
    #[serde(default)]
    pub drive: DriveSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub rpc: RpcSettings,
}

/// Where things live on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GeneralSettings {
    /// Overrides the platform data directory for `bookmarkpro.db`.
    pub data_dir: Option<String>,
}

/// Bookmark library behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibrarySettings {
    pub seed_sample_data: bool,
    /// Favicon lookup service; `{domain}` is replaced by the bookmark host.
    pub favicon_service: String,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            seed_sample_data: true,
            favicon_service: "https://www.google.com/s2/favicons?domain={domain}&sz=16".to_string(),
        }
    }
}

/// How a pulled cloud document is reconciled with the local collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReconcilePolicy {
    /// Keep every local record; add remote records whose URL is new.
    #[default]
    Merge,
    /// The remote collection wholly supersedes the local one.
    Replace,
}

/// Cloud sync settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSettings {
    pub enabled: bool,
    pub policy: ReconcilePolicy,
    /// Push after every local mutation while signed in.
    pub auto_push: bool,
    pub document_name: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            policy: ReconcilePolicy::Merge,
            auto_push: true,
            document_name: "bookmarkpro-bookmarks.json".to_string(),
        }
    }
}

/// OAuth identity provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentitySettings {
    pub client_id: String,
    pub scope: String,
    pub auth_url: String,
    pub redirect_uri: String,
    pub userinfo_url: String,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            scope: "https://www.googleapis.com/auth/drive.appdata".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            redirect_uri: "http://localhost:8765/oauth/callback".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
        }
    }
}

/// Cloud document store endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriveSettings {
    pub api_base: String,
    pub upload_base: String,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/drive/v3".to_string(),
            upload_base: "https://www.googleapis.com/upload/drive/v3".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    pub dismiss_after_ms: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            dismiss_after_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcSettings {
    pub max_requests_per_second: u32,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            max_requests_per_second: 200,
        }
    }
}
