//! Resource retrieval: the fetcher trait, batching, and the HTTP transport.

mod error;
mod fetcher;
mod http;

pub use error::{FetchCause, FetchError};
pub use fetcher::{FetchRequest, ResourceFetcher};
pub use http::{endpoint_url, HttpFetcher, HttpFetcherConfig};
