//! Resource bundles and their cache keys.
//!
//! A bundle holds the nested key→text content of one namespace in one locale,
//! plus the metadata the store needs for budgeting and expiry.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Cache key for one `(locale, namespace)` pair, rendered as `locale/namespace`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(locale: &str, namespace: &str) -> Self {
        Self(format!("{}/{}", locale, namespace))
    }

    /// Locale component (everything before the first `/`).
    pub fn locale(&self) -> &str {
        self.0.split_once('/').map(|(l, _)| l).unwrap_or(&self.0)
    }

    /// Namespace component (everything after the first `/`).
    pub fn namespace(&self) -> &str {
        self.0.split_once('/').map(|(_, n)| n).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Loaded text content for one namespace in one locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBundle {
    /// Nested key→text tree.
    pub content: Value,
    /// Size charged against the store budget.
    pub size_bytes: usize,
    /// When the bundle was retrieved.
    pub loaded_at: DateTime<Utc>,
    /// Server-provided version (ETag) or content digest.
    pub version_tag: String,
}

impl ResourceBundle {
    /// Create a bundle stamped with the current time.
    pub fn new(content: Value, size_bytes: usize, version_tag: impl Into<String>) -> Self {
        Self::with_timestamp(content, size_bytes, version_tag, Utc::now())
    }

    /// Create a bundle with an explicit load timestamp.
    pub fn with_timestamp(
        content: Value,
        size_bytes: usize,
        version_tag: impl Into<String>,
        loaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            content,
            size_bytes,
            loaded_at,
            version_tag: version_tag.into(),
        }
    }

    /// Decode a JSON body. Size is the body length; the version tag falls back
    /// to a digest of the body when none is supplied.
    pub fn from_json_bytes(body: &[u8], version_tag: Option<String>) -> Result<Self, serde_json::Error> {
        let content: Value = serde_json::from_slice(body)?;
        let version_tag = version_tag.unwrap_or_else(|| content_digest(body));
        Ok(Self::new(content, body.len(), version_tag))
    }

    /// Resolve a dotted key (`"nav.home.title"`) to its string leaf.
    ///
    /// Returns `None` when any segment is missing or the leaf is not a string.
    pub fn lookup(&self, dotted_key: &str) -> Option<&str> {
        if dotted_key.is_empty() {
            return None;
        }
        let mut node = &self.content;
        for segment in dotted_key.split('.') {
            node = node.as_object()?.get(segment)?;
        }
        node.as_str()
    }

    /// True once `loaded_at` is older than `ttl` relative to `now`.
    pub fn is_expired_at(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.loaded_at > ttl
    }
}

/// Short SHA-256 digest of a body, used as a version tag.
pub fn content_digest(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    hex::encode(&digest[..8])
}
