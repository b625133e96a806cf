//! Storage backend client for fetching file content.

use anyhow::{Context, Result, bail, ensure};
use async_trait::async_trait;
use common::auth::{API_KEY_HEADER, ApiKey};
use tracing::{debug, warn};

/// Read access to file content by content ID.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get_object(&self, content_id: &str) -> Result<Vec<u8>>;
}

/// Content IDs are opaque but must be safe to place in a URL path.
pub fn validate_content_id(content_id: &str) -> Result<()> {
    ensure!(!content_id.is_empty(), "content id is empty");
    ensure!(content_id.len() <= 256, "content id is longer than 256 bytes");
    ensure!(
        content_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')),
        "content id contains characters outside [A-Za-z0-9._-]"
    );
    Ok(())
}

/// [`StorageBackend`] backed by the storage gateway (`GET /objects/{id}`).
#[derive(Clone)]
pub struct HttpStorageBackend {
    base_url: String,
    api_key: Option<ApiKey>,
    client: reqwest::Client,
}

impl HttpStorageBackend {
    pub fn new(base_url: &str, api_key: Option<ApiKey>) -> Result<Self> {
        if api_key.is_none() {
            warn!("No storage API key configured, requests are sent unauthenticated");
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::builder()
                .build()
                .context("failed to build storage client")?,
        })
    }
}

#[async_trait]
impl StorageBackend for HttpStorageBackend {
    async fn get_object(&self, content_id: &str) -> Result<Vec<u8>> {
        validate_content_id(content_id)?;
        let url = format!("{}/objects/{}", self.base_url, content_id);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key.header_value());
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", content_id))?;

        let status = response.status();
        if !status.is_success() {
            bail!("storage returned {} for {}", status, content_id);
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("failed to read body of {}", content_id))?;
        debug!(content_id, size = bytes.len(), "Fetched object");
        Ok(bytes.to_vec())
    }
}
