//! Fetch error types.

use std::fmt;

use thiserror::Error;

use crate::cache::CacheKey;

/// Underlying reason a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCause {
    /// Server answered with a non-success status.
    Status(u16),
    /// Request never produced a response (DNS, connect, timeout, bad URL).
    Transport(String),
    /// Response body could not be decoded as a bundle.
    Decode(String),
}

impl fmt::Display for FetchCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchCause::Status(code) => write!(f, "HTTP status {}", code),
            FetchCause::Transport(msg) => write!(f, "transport error: {}", msg),
            FetchCause::Decode(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

/// Errors returned by a [`ResourceFetcher`](super::ResourceFetcher).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Failed to fetch {locale}/{namespace}: {cause}")]
    FetchFailure {
        locale: String,
        namespace: String,
        cause: FetchCause,
    },
}

impl FetchError {
    pub fn failure(locale: &str, namespace: &str, cause: FetchCause) -> Self {
        FetchError::FetchFailure {
            locale: locale.to_string(),
            namespace: namespace.to_string(),
            cause,
        }
    }

    /// Cache key of the request that failed.
    pub fn key(&self) -> CacheKey {
        match self {
            FetchError::FetchFailure { locale, namespace, .. } => CacheKey::new(locale, namespace),
        }
    }

    pub fn cause(&self) -> &FetchCause {
        match self {
            FetchError::FetchFailure { cause, .. } => cause,
        }
    }

    /// Whether a caller-initiated retry could plausibly succeed.
    ///
    /// Fetches are never retried automatically; this only classifies.
    pub fn is_retryable(&self) -> bool {
        match self.cause() {
            FetchCause::Status(code) => *code == 429 || *code >= 500,
            FetchCause::Transport(_) => true,
            FetchCause::Decode(_) => false,
        }
    }
}
