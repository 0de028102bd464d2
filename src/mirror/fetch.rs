//! HTTP GETs for the page and its assets.

use crate::error::MirrorError;
use std::time::Duration;

const USER_AGENT: &str = concat!("pin-page/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper around a shared reqwest client
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpFetcher {
    /// Create a fetcher with an optional per-request timeout
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            client: builder.build().unwrap_or_default(),
        }
    }

    /// Wrap an existing client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// GET a text body, failing on an empty response
    pub async fn get_text(&self, url: &str) -> Result<String, MirrorError> {
        let response = self.send(url).await?;
        let body = response.text().await.map_err(|source| MirrorError::Fetch {
            url: url.to_string(),
            source,
        })?;

        if body.is_empty() {
            return Err(MirrorError::EmptyResponse {
                url: url.to_string(),
            });
        }

        Ok(body)
    }

    /// GET a binary body
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, MirrorError> {
        let response = self.send(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| MirrorError::Fetch {
                url: url.to_string(),
                source,
            })?;

        Ok(bytes.to_vec())
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, MirrorError> {
        ::log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| MirrorError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}
