use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Profile of the signed-in user. Informational only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub picture: String,
}

impl UserProfile {
    /// Profile used when the profile endpoint cannot be reached.
    pub fn placeholder() -> Self {
        Self {
            name: "User".to_string(),
            email: String::new(),
            picture: String::new(),
        }
    }
}

/// Opaque bearer token. Wiped from memory on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    pub fn secret(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// An active session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: UserProfile,
    pub access_token: AccessToken,
}

/// Sign-in state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    SignedOut,
    Authenticating,
    SignedIn(Session),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::SignedOut => "signed_out",
            SessionState::Authenticating => "authenticating",
            SessionState::SignedIn(_) => "signed_in",
        }
    }
}

/// Payload delivered by the identity provider's token callback: either an
/// access token or an error code.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenResponse {
    pub fn granted(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn denied(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Resolves the callback payload. An error wins over a token; a payload
    /// with neither is treated as an error too.
    pub fn into_result(self) -> Result<AccessToken, String> {
        if let Some(error) = self.error {
            return Err(match self.error_description {
                Some(desc) => format!("{}: {}", error, desc),
                None => error,
            });
        }
        match self.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            _ => Err("missing access_token".to_string()),
        }
    }
}
