//! HTTP transport for resource bundles.
//!
//! Bundles are served as `{base_url}/{locale}/{namespace}.json`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tokio::sync::Semaphore;
use tracing::debug;

use super::error::{FetchCause, FetchError};
use super::fetcher::ResourceFetcher;
use crate::cache::ResourceBundle;

/// Configuration for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Absolute base URL, e.g. `https://cdn.example.com/locales`.
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Ceiling on simultaneous requests from this fetcher.
    pub max_connections: usize,
    pub user_agent: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            base_url: "/locales".to_string(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            max_connections: 3,
            user_agent: format!("lexiload/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Build the endpoint URL for one bundle.
pub fn endpoint_url(base_url: &str, locale: &str, namespace: &str) -> String {
    format!("{}/{}/{}.json", base_url.trim_end_matches('/'), locale, namespace)
}

/// Strip weak-validator prefix and quotes from an ETag value.
fn normalize_etag(raw: &str) -> Option<String> {
    let tag = raw.trim().trim_start_matches("W/").trim_matches('"');
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    }
}

/// Fetches bundles over HTTP with compression negotiated by the client.
pub struct HttpFetcher {
    client: Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl HttpFetcher {
    pub fn new(config: HttpFetcherConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_connections.max(1))),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch_one(&self, locale: &str, namespace: &str) -> Result<ResourceBundle, FetchError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| FetchError::failure(locale, namespace, FetchCause::Transport(e.to_string())))?;

        let url = endpoint_url(&self.base_url, locale, namespace);
        debug!(url = %url, "Fetching bundle");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::failure(locale, namespace, FetchCause::Transport(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::failure(locale, namespace, FetchCause::Status(status.as_u16())));
        }

        let etag = response
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .and_then(normalize_etag);
        let content_length = response.content_length();

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::failure(locale, namespace, FetchCause::Transport(e.to_string())))?;

        let mut bundle = ResourceBundle::from_json_bytes(&body, etag)
            .map_err(|e| FetchError::failure(locale, namespace, FetchCause::Decode(e.to_string())))?;
        // Decompressed responses drop Content-Length; fall back to the body.
        if let Some(len) = content_length {
            bundle.size_bytes = len as usize;
        }

        debug!(
            url = %url,
            size_bytes = bundle.size_bytes,
            version = %bundle.version_tag,
            "Bundle fetched"
        );
        Ok(bundle)
    }
}
