//! Normalizes every [`MediaInput`] shape to a byte buffer.
//!
//! Remote inputs go through a [`Fetcher`], so tests and embedders can swap
//! the HTTP client out. Size validation of the result is left to the engine.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;

use stickerforge_core::config::FetchConfig;
use stickerforge_core::{is_base64_data_uri, Error, MediaInput, Result};

/// Retrieves the body behind a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`Error::FetchFailed`] on transport errors, non-success
    /// statuses, and empty bodies.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Fetcher`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Fetching {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch_failed(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch_failed(url, format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::fetch_failed(url, format!("reading body: {e}")))?;
        if body.is_empty() {
            return Err(Error::fetch_failed(url, "empty response body"));
        }

        tracing::debug!("Fetched {} bytes from {url}", body.len());
        Ok(body.to_vec())
    }
}

/// Turns inputs into bytes.
#[derive(Clone)]
pub struct InputResolver {
    fetcher: Arc<dyn Fetcher>,
}

impl InputResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Resolver with an [`HttpFetcher`] built from `config`.
    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(Arc::new(HttpFetcher::new(config)))
    }

    /// Resolve `input` to its bytes.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInputKind`] for a data URI without a base64 payload.
    /// - [`Error::FetchFailed`] for URL inputs the fetcher cannot retrieve.
    /// - [`Error::Io`] when a local path cannot be read.
    pub async fn resolve(&self, input: MediaInput) -> Result<Vec<u8>> {
        tracing::debug!("Resolving {} input", input.kind_label());
        match input {
            MediaInput::Bytes(bytes) => Ok(bytes),
            MediaInput::DataUri(uri) => decode_data_uri(&uri),
            MediaInput::RemoteUrl(url) | MediaInput::UrlObject { url } => {
                self.fetcher.fetch(&url).await
            }
            MediaInput::LocalPath(path) => Ok(tokio::fs::read(&path).await?),
        }
    }
}

/// Decode `data:<mime>[;params];base64,<payload>`.
///
/// Whitespace inside the payload (line-wrapped URIs) is ignored.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let invalid = |reason: &str| Error::InvalidInputKind(format!("data URI {reason}"));

    let trimmed = uri.trim();
    if !is_base64_data_uri(trimmed) {
        return Err(invalid("is not `data:<mime>;base64,<payload>`"));
    }
    let payload = trimmed.split_once(',').map_or("", |(_, payload)| payload);

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| invalid(&format!("payload is not valid base64: {e}")))
}
