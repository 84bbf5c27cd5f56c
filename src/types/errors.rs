use thiserror::Error;

// === BookmarkError ===

/// Validation errors raised by bookmark mutations. The store is left unchanged
/// whenever one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookmarkError {
    /// The URL field was empty after trimming.
    #[error("URL is required")]
    EmptyUrl,
    /// The URL could not be parsed as an absolute URL.
    #[error("Please enter a valid URL: {0}")]
    InvalidUrl(String),
    /// The title field was empty after trimming.
    #[error("Title is required")]
    EmptyTitle,
    /// Another bookmark already uses this URL.
    #[error("This URL is already bookmarked: {0}")]
    DuplicateUrl(String),
}

// === StorageError ===

/// Errors from the durable key/value storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Storage database error: {0}")]
    DatabaseError(String),
    /// A stored value could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    SerializationError(String),
    /// The backing store refused the write (full, read-only, poisoned lock).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::DatabaseError(e.to_string())
    }
}

// === CryptoError ===

/// Errors related to sealing the access token at rest.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Failed to derive the sealing key.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),
    /// Encryption operation failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),
    /// Decryption operation failed.
    #[error("Decryption failed: {0}")]
    Decryption(String),
    /// Failed to generate random bytes.
    #[error("Random generation failed: {0}")]
    RandomGeneration(String),
}

// === SessionError ===

/// Errors related to sign-in, sign-out and session restore.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The requested action is not allowed from the current state.
    #[error("Cannot {action} while {state}")]
    InvalidTransition { state: String, action: String },
    /// The identity provider returned an error instead of a token.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),
    /// The user-profile endpoint could not be reached or returned garbage.
    #[error("Profile unavailable: {0}")]
    ProfileUnavailable(String),
    /// Reading or writing the durable session record failed.
    #[error("Session storage error: {0}")]
    StorageError(String),
    /// Sealing or unsealing the access token failed.
    #[error("Session crypto error: {0}")]
    CryptoError(String),
}

// === SyncError ===

/// Errors related to cloud synchronization.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No active session; sync requires a signed-in user.
    #[error("Please sign in to sync bookmarks")]
    NotSignedIn,
    /// Cloud sync is disabled in the settings.
    #[error("Cloud sync is disabled")]
    Disabled,
    /// Transport failure talking to the cloud document store.
    #[error("Sync network error: {0}")]
    NetworkError(String),
    /// The cloud document store answered with a non-success status.
    #[error("Sync remote error ({status}): {message}")]
    RemoteError { status: u16, message: String },
    /// The remote document could not be parsed.
    #[error("Invalid remote document: {0}")]
    InvalidDocument(String),
    /// The local collection could not be serialized.
    #[error("Sync serialization error: {0}")]
    SerializationError(String),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    /// No settings file is attached to the app.
    #[error("Settings are not backed by a file")]
    NotAttached,
}
