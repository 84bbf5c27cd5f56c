//! Identity provider glue: the authorization URL the UI opens in its popup,
//! and the user-profile lookup performed once a token arrives.

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::types::errors::SessionError;
use crate::types::session::UserProfile;
use crate::types::settings::IdentitySettings;

/// Trait for fetching the signed-in user's profile.
#[async_trait]
pub trait ProfileClient: Send + Sync {
    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile, SessionError>;
}

/// Profile lookup against an OAuth `userinfo` endpoint.
pub struct HttpProfileClient {
    http: Client,
    userinfo_url: String,
}

impl HttpProfileClient {
    pub fn new(http: Client, userinfo_url: impl Into<String>) -> Self {
        Self {
            http,
            userinfo_url: userinfo_url.into(),
        }
    }
}

#[async_trait]
impl ProfileClient for HttpProfileClient {
    async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile, SessionError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SessionError::ProfileUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SessionError::ProfileUnavailable(format!(
                "userinfo returned {}",
                response.status()
            )));
        }

        response
            .json::<UserProfile>()
            .await
            .map_err(|e| SessionError::ProfileUnavailable(e.to_string()))
    }
}

/// Builds the implicit-grant authorization URL for the sign-in popup.
pub fn authorization_url(settings: &IdentitySettings, state: &str) -> Result<String, SessionError> {
    let mut url = Url::parse(&settings.auth_url)
        .map_err(|e| SessionError::AuthFailed(format!("invalid auth_url: {}", e)))?;
    url.query_pairs_mut()
        .append_pair("client_id", &settings.client_id)
        .append_pair("redirect_uri", &settings.redirect_uri)
        .append_pair("response_type", "token")
        .append_pair("scope", &settings.scope)
        .append_pair("prompt", "consent")
        .append_pair("state", state);
    Ok(url.into())
}
