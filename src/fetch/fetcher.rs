//! The fetcher seam between the loader and the transport.

use async_trait::async_trait;
use futures::future::join_all;
use tracing::warn;

use super::error::FetchError;
use crate::cache::ResourceBundle;

/// One `(locale, namespace)` retrieval request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub locale: String,
    pub namespace: String,
}

impl FetchRequest {
    pub fn new(locale: &str, namespace: &str) -> Self {
        Self {
            locale: locale.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

/// Retrieves resource bundles.
///
/// `fetch_one` issues exactly one request and never retries.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch_one(&self, locale: &str, namespace: &str) -> Result<ResourceBundle, FetchError>;

    /// Fetch many bundles, at most `limit` at a time.
    ///
    /// Requests are split into chunks of `limit`; each chunk runs concurrently
    /// and chunks run one after another. Failed requests are logged and left
    /// out of the result.
    async fn fetch_batch(
        &self,
        requests: &[FetchRequest],
        limit: usize,
    ) -> Vec<(FetchRequest, ResourceBundle)> {
        let limit = limit.max(1);
        let mut loaded = Vec::with_capacity(requests.len());

        for chunk in requests.chunks(limit) {
            let results = join_all(
                chunk
                    .iter()
                    .map(|req| self.fetch_one(&req.locale, &req.namespace)),
            )
            .await;

            for (req, result) in chunk.iter().zip(results) {
                match result {
                    Ok(bundle) => loaded.push((req.clone(), bundle)),
                    Err(e) => warn!(
                        locale = %req.locale,
                        namespace = %req.namespace,
                        error = %e,
                        "Batch fetch failed; skipping"
                    ),
                }
            }
        }

        loaded
    }
}
