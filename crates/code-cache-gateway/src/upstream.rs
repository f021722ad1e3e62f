//! Upstream image fetching

use flat_file_cache::ResourceKey;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("code-cache-gateway/", env!("CARGO_PKG_VERSION"));

/// Why an upstream fetch produced nothing cacheable
#[derive(Debug)]
pub enum UpstreamError {
    /// Connection, TLS, timeout or body read failure
    Transport(Box<reqwest::Error>),
    /// Upstream answered with a non-success status
    Status(u16),
    /// Upstream answered successfully but with no content
    EmptyBody,
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Transport(err) => write!(f, "HTTP error: {}", err),
            UpstreamError::Status(status) => write!(f, "Upstream returned status {}", status),
            UpstreamError::EmptyBody => write!(f, "Upstream returned an empty body"),
        }
    }
}

impl std::error::Error for UpstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpstreamError::Transport(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Transport(Box::new(err))
    }
}

/// HTTP client for the upstream image service at `<base_url>/<key>`
pub struct UpstreamFetcher {
    client: Client,
    base_url: String,
}

impl UpstreamFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client that ignores proxy environment variables, for talking to local test servers
    #[cfg(test)]
    pub fn direct(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, key: &ResourceKey) -> String {
        format!("{}/{}", self.base_url, key)
    }

    /// Fetch the image for `key`. Only a non-empty successful body is `Ok`.
    pub async fn fetch(&self, key: &ResourceKey) -> Result<Vec<u8>, UpstreamError> {
        let url = self.url_for(key);
        debug!(url = %url, "Fetching from upstream");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "Upstream fetch failed");
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        let data = response.bytes().await?.to_vec();

        if data.is_empty() {
            warn!(url = %url, "Upstream returned an empty body");
            return Err(UpstreamError::EmptyBody);
        }

        debug!(url = %url, size = data.len(), "Fetched from upstream");
        Ok(data)
    }
}
