//! Client side of the content-addressed storage service.
//!
//! `HttpStorageClient` speaks to an HTTP upload bridge:
//!
//! * `POST {endpoint}/login` with `{"email": ...}` returns `{"session": ...}`
//! * `GET {endpoint}/spaces/{space}` with the session as bearer token selects a space
//! * `POST {endpoint}/spaces/{space}/upload` takes one multipart `file` part
//!   per file, named by its path inside the directory, and returns `{"root": "<cid>"}`

use crate::config::StorageConfig;
use crate::error::PublishError;
use crate::results::{ContentId, UploadFile};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

/// A storage network that accepts whole-directory uploads
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Establish a session for the account
    async fn login(&mut self, account: &str) -> Result<(), PublishError>;

    /// Select the space subsequent uploads go to
    async fn set_current_space(&mut self, space: &str) -> Result<(), PublishError>;

    /// Upload the files as a single directory and return its content identifier
    async fn upload_directory(&self, files: &[UploadFile]) -> Result<ContentId, PublishError>;
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    session: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    root: String,
}

/// `StorageClient` backed by the HTTP upload bridge
pub struct HttpStorageClient {
    client: reqwest::Client,
    endpoint: String,
    session: Option<String>,
    space: Option<String>,
}

impl HttpStorageClient {
    pub fn new(config: &StorageConfig, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            client: builder.build().unwrap_or_default(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            session: None,
            space: None,
        }
    }

    fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }
}

#[async_trait]
impl StorageClient for HttpStorageClient {
    async fn login(&mut self, account: &str) -> Result<(), PublishError> {
        let auth_err = |reason: String| PublishError::Auth {
            account: account.to_string(),
            reason,
        };

        let response = self
            .client
            .post(format!("{}/login", self.endpoint))
            .json(&serde_json::json!({ "email": account }))
            .send()
            .await
            .map_err(|e| auth_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(auth_err(format!("HTTP {}", status.as_u16())));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| auth_err(format!("malformed login response: {}", e)))?;
        if body.session.trim().is_empty() {
            return Err(auth_err("empty session token".to_string()));
        }

        ::log::info!("Logged in as {}", account);
        self.session = Some(body.session);
        Ok(())
    }

    async fn set_current_space(&mut self, space: &str) -> Result<(), PublishError> {
        let space_err = |reason: String| PublishError::Space {
            space: space.to_string(),
            reason,
        };

        let session = self
            .session()
            .ok_or_else(|| space_err("not logged in".to_string()))?;

        let response = self
            .client
            .get(format!("{}/spaces/{}", self.endpoint, space))
            .bearer_auth(session)
            .send()
            .await
            .map_err(|e| space_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(space_err(format!("HTTP {}", status.as_u16())));
        }

        ::log::info!("Current space set to {}", space);
        self.space = Some(space.to_string());
        Ok(())
    }

    async fn upload_directory(&self, files: &[UploadFile]) -> Result<ContentId, PublishError> {
        let (Some(session), Some(space)) = (self.session(), self.space.as_deref()) else {
            return Err(PublishError::Upload(
                "no session or space selected".to_string(),
            ));
        };

        let form = files.iter().fold(Form::new(), |form, file| {
            let part = Part::bytes(file.contents.clone()).file_name(file.name.clone());
            form.part("file", part)
        });

        let response = self
            .client
            .post(format!("{}/spaces/{}/upload", self.endpoint, space))
            .bearer_auth(session)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublishError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Upload(format!("HTTP {}", status.as_u16())));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Upload(format!("malformed upload response: {}", e)))?;

        ContentId::parse(&body.root)
    }
}
