//! Google Drive v3 implementation of [`CloudDocumentStore`].
//!
//! Documents live in the `appDataFolder` space, which is private to the
//! OAuth client and invisible in the user's Drive UI.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;

use crate::services::cloud_store::CloudDocumentStore;
use crate::types::errors::SyncError;
use crate::types::settings::DriveSettings;

const APP_DATA_FOLDER: &str = "appDataFolder";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    id: String,
}

pub struct DriveDocumentStore {
    http: Client,
    api_base: String,
    upload_base: String,
}

impl DriveDocumentStore {
    pub fn new(http: Client, settings: &DriveSettings) -> Self {
        Self {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            upload_base: settings.upload_base.trim_end_matches('/').to_string(),
        }
    }

    /// Maps a non-success response to [`SyncError::RemoteError`].
    async fn check(response: Response) -> Result<Response, SyncError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(SyncError::RemoteError {
            status: status.as_u16(),
            message,
        })
    }
}

fn network(e: reqwest::Error) -> SyncError {
    SyncError::NetworkError(e.to_string())
}

fn json_part(body: String) -> Result<Part, SyncError> {
    Part::text(body)
        .mime_str("application/json")
        .map_err(|e| SyncError::SerializationError(e.to_string()))
}

#[async_trait]
impl CloudDocumentStore for DriveDocumentStore {
    async fn find_document(&self, token: &str, name: &str) -> Result<Option<String>, SyncError> {
        let query = format!(
            "name = '{}' and '{}' in parents and trashed = false",
            name.replace('\'', "\\'"),
            APP_DATA_FOLDER
        );
        let response = self
            .http
            .get(format!("{}/files", self.api_base))
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("spaces", APP_DATA_FOLDER),
                ("fields", "files(id,name)"),
            ])
            .send()
            .await
            .map_err(network)?;

        let list: FileList = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SyncError::InvalidDocument(e.to_string()))?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create_document(&self, token: &str, name: &str, content: &str) -> Result<String, SyncError> {
        // Metadata and body go up in one multipart request, so a failed
        // create never leaves an empty document behind.
        let metadata = json!({
            "name": name,
            "parents": [APP_DATA_FOLDER],
            "mimeType": "application/json",
        });
        let form = Form::new()
            .part("metadata", json_part(metadata.to_string())?)
            .part("file", json_part(content.to_string())?);

        let response = self
            .http
            .post(format!("{}/files", self.upload_base))
            .bearer_auth(token)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .multipart(form)
            .send()
            .await
            .map_err(network)?;

        let created: FileRef = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SyncError::InvalidDocument(e.to_string()))?;
        Ok(created.id)
    }

    async fn update_document(&self, token: &str, id: &str, content: &str) -> Result<(), SyncError> {
        let response = self
            .http
            .patch(format!("{}/files/{}", self.upload_base, id))
            .bearer_auth(token)
            .query(&[("uploadType", "media")])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(content.to_string())
            .send()
            .await
            .map_err(network)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn read_document(&self, token: &str, id: &str) -> Result<String, SyncError> {
        let response = self
            .http
            .get(format!("{}/files/{}", self.api_base, id))
            .bearer_auth(token)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(network)?;
        Self::check(response).await?.text().await.map_err(network)
    }
}
