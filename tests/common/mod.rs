//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use lexiload::cache::ResourceBundle;
use lexiload::catalog::{Catalog, NamespaceGraph};
use lexiload::fetch::{FetchCause, FetchError, ResourceFetcher};

/// In-memory fetcher that counts calls and can be told to fail or stall.
#[derive(Default)]
pub struct MockFetcher {
    calls: Mutex<HashMap<String, usize>>,
    order: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    sizes: Mutex<HashMap<String, usize>>,
    delay: Mutex<Option<Duration>>,
}

impl MockFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        let fetcher = Self::default();
        *fetcher.delay.lock() = Some(delay);
        Arc::new(fetcher)
    }

    /// Make every fetch of `namespace` fail with a 503.
    pub fn fail(&self, namespace: &str) {
        self.failing.lock().insert(namespace.to_string());
    }

    pub fn recover(&self, namespace: &str) {
        self.failing.lock().remove(namespace);
    }

    /// Force the reported size of `namespace` bundles.
    pub fn set_size(&self, namespace: &str, bytes: usize) {
        self.sizes.lock().insert(namespace.to_string(), bytes);
    }

    pub fn calls(&self, locale: &str, namespace: &str) -> usize {
        self.calls
            .lock()
            .get(&format!("{locale}:{namespace}"))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    /// Namespaces in the order their fetches started.
    pub fn fetch_order(&self) -> Vec<String> {
        self.order.lock().clone()
    }
}

#[async_trait]
impl ResourceFetcher for MockFetcher {
    async fn fetch_one(&self, locale: &str, namespace: &str) -> Result<ResourceBundle, FetchError> {
        *self
            .calls
            .lock()
            .entry(format!("{locale}:{namespace}"))
            .or_insert(0) += 1;
        self.order.lock().push(namespace.to_string());

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().contains(namespace) {
            return Err(FetchError::failure(locale, namespace, FetchCause::Status(503)));
        }

        let content = json!({
            "title": format!("{namespace} title"),
            "nested": { "greeting": format!("hello from {locale}") },
            "count": 3,
        });
        let size = self.sizes.lock().get(namespace).copied().unwrap_or(100);
        Ok(ResourceBundle::new(content, size, format!("v-{namespace}")))
    }
}

/// `common` (critical), `auth` (high, depends on common),
/// `admin` (depends on common and auth, serves `/admin*`).
pub const ADMIN_CATALOG: &str = r#"
base_namespace = "common"
auth_namespace = "auth"

[[namespaces]]
name = "common"
priority = "critical"
estimated_size_bytes = 1000

[[namespaces]]
name = "auth"
priority = "high"
dependencies = ["common"]
estimated_size_bytes = 500

[[namespaces]]
name = "admin"
dependencies = ["common", "auth"]
route_patterns = ["/admin*"]
estimated_size_bytes = 800
"#;

/// A wider catalog covering the routes the default prediction tables know.
pub const APP_CATALOG: &str = r#"
[[namespaces]]
name = "common"
priority = "critical"

[[namespaces]]
name = "auth"
priority = "high"
dependencies = ["common"]

[[namespaces]]
name = "orders"
dependencies = ["common"]
route_patterns = ["/orders*"]

[[namespaces]]
name = "profile"
dependencies = ["common"]
route_patterns = ["/profile*"]

[[namespaces]]
name = "settings"
priority = "low"
dependencies = ["common"]
route_patterns = ["/settings*"]

[[namespaces]]
name = "wallet"
priority = "high"
dependencies = ["common"]
route_patterns = ["/wallet*", "/transactions*"]

[[namespaces]]
name = "lottery"
dependencies = ["common", "wallet"]
route_patterns = ["/lottery*"]

[[namespaces]]
name = "feed"
priority = "low"
dependencies = ["common"]
route_patterns = ["/load-more", "/next-page"]
"#;

pub fn graph(toml: &str) -> NamespaceGraph {
    Catalog::from_toml(toml)
        .expect("catalog parses")
        .into_graph()
        .expect("catalog is valid")
}
