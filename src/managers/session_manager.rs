//! Session Manager for BookmarkPro.
//!
//! Drives the sign-in state machine
//! (`SignedOut -> Authenticating -> SignedIn -> SignedOut`) and keeps the
//! session durable across restarts. The access token is sealed with
//! [`TokenSealer`] before it is written under `accessToken`.

use std::sync::Arc;

use crate::database::kv_store::{KeyValueStore, KEY_ACCESS_TOKEN, KEY_CURRENT_USER};
use crate::services::crypto_service::TokenSealer;
use crate::services::identity::ProfileClient;
use crate::types::errors::SessionError;
use crate::types::session::{AccessToken, Session, SessionState, TokenResponse, UserProfile};

/// Internal sealing key material for the stored access token.
const SESSION_KEY_PASSPHRASE: &str = "bookmarkpro-session-key-v1";
const SESSION_KEY_SALT: &[u8] = b"bookmarkpro-sess";

pub struct SessionManager {
    kv: Arc<dyn KeyValueStore>,
    sealer: TokenSealer,
    state: SessionState,
}

impl SessionManager {
    /// Creates a signed-out manager. Derives the token sealing key.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Result<Self, SessionError> {
        let sealer = TokenSealer::derive(SESSION_KEY_PASSPHRASE, SESSION_KEY_SALT)
            .map_err(|e| SessionError::CryptoError(e.to_string()))?;
        Ok(Self {
            kv,
            sealer,
            state: SessionState::SignedOut,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self.state, SessionState::SignedIn(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::SignedIn(session) => Some(session),
            _ => None,
        }
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.session().map(|s| &s.user)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session().map(|s| s.access_token.secret())
    }

    fn invalid(&self, action: &str) -> SessionError {
        SessionError::InvalidTransition {
            state: self.state.name().replace('_', " "),
            action: action.to_string(),
        }
    }

    /// Restores a durable session on startup. Returns true if the manager is
    /// now signed in. A missing or damaged record leaves it signed out and
    /// the damaged record is cleared.
    pub fn restore(&mut self) -> bool {
        if !matches!(self.state, SessionState::SignedOut) {
            return self.is_signed_in();
        }

        match self.read_durable() {
            Ok(Some(session)) => {
                tracing::info!(user = %session.user.email, "Restored session");
                self.state = SessionState::SignedIn(session);
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session record");
                self.clear_durable();
                false
            }
        }
    }

    /// `SignedOut -> Authenticating`.
    pub fn begin_sign_in(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::SignedOut) {
            return Err(self.invalid("begin sign-in"));
        }
        self.state = SessionState::Authenticating;
        Ok(())
    }

    /// Handles the identity provider's token callback.
    ///
    /// On a token: fetches the profile (falling back to a placeholder when
    /// the lookup fails), persists the session, moves to `SignedIn` and
    /// returns the signed-in profile.
    /// On an error: clears partial state and moves back to `SignedOut`.
    pub async fn complete_sign_in(
        &mut self,
        response: TokenResponse,
        profiles: &dyn ProfileClient,
    ) -> Result<UserProfile, SessionError> {
        if !matches!(self.state, SessionState::Authenticating) {
            return Err(self.invalid("complete sign-in"));
        }

        let token = match response.into_result() {
            Ok(token) => token,
            Err(error) => {
                tracing::error!(%error, "Token error");
                self.state = SessionState::SignedOut;
                self.clear_durable();
                return Err(SessionError::AuthFailed(error));
            }
        };

        let user = match profiles.fetch_profile(token.secret()).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Error getting user info, using placeholder profile");
                UserProfile::placeholder()
            }
        };

        let session = Session {
            user: user.clone(),
            access_token: token,
        };
        if let Err(e) = self.write_durable(&session) {
            tracing::error!(error = %e, "Session will not survive a restart");
        }
        self.state = SessionState::SignedIn(session);
        Ok(user)
    }

    /// Clears in-memory and durable state. Returns true if a session or a
    /// pending sign-in was dropped.
    pub fn sign_out(&mut self) -> bool {
        let was_active = !matches!(self.state, SessionState::SignedOut);
        self.state = SessionState::SignedOut;
        self.clear_durable();
        was_active
    }

    fn read_durable(&self) -> Result<Option<Session>, SessionError> {
        let sealed = self
            .kv
            .get(KEY_ACCESS_TOKEN)
            .map_err(|e| SessionError::StorageError(e.to_string()))?;
        let user_json = self
            .kv
            .get(KEY_CURRENT_USER)
            .map_err(|e| SessionError::StorageError(e.to_string()))?;

        let (sealed, user_json) = match (sealed, user_json) {
            (Some(sealed), Some(user_json)) => (sealed, user_json),
            (None, None) => return Ok(None),
            _ => {
                return Err(SessionError::StorageError(
                    "incomplete session record".to_string(),
                ))
            }
        };

        let token = self
            .sealer
            .open(&sealed)
            .map_err(|e| SessionError::CryptoError(e.to_string()))?;
        if token.is_empty() {
            return Err(SessionError::StorageError("empty access token".to_string()));
        }
        let user: UserProfile = serde_json::from_str(&user_json)
            .map_err(|e| SessionError::StorageError(e.to_string()))?;

        Ok(Some(Session {
            user,
            access_token: AccessToken::new(token.as_str()),
        }))
    }

    fn write_durable(&self, session: &Session) -> Result<(), SessionError> {
        let sealed = self
            .sealer
            .seal(session.access_token.secret())
            .map_err(|e| SessionError::CryptoError(e.to_string()))?;
        let user_json = serde_json::to_string(&session.user)
            .map_err(|e| SessionError::StorageError(e.to_string()))?;

        self.kv
            .set(KEY_ACCESS_TOKEN, &sealed)
            .and_then(|_| self.kv.set(KEY_CURRENT_USER, &user_json))
            .map_err(|e| SessionError::StorageError(e.to_string()))
    }

    fn clear_durable(&self) {
        for key in [KEY_ACCESS_TOKEN, KEY_CURRENT_USER] {
            if let Err(e) = self.kv.remove(key) {
                tracing::error!(error = %e, key, "Error clearing session record");
            }
        }
    }
}
