//! Load coordination: one in-flight fetch per cache key.
//!
//! Each load runs as its own task, so it completes even after every caller
//! has stopped awaiting it. Concurrent callers for the same key join a shared
//! handle to that task held in the pending table. The store and state maps
//! are only touched in short synchronous sections; no lock is held across
//! the fetch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};

use super::state::{LoadError, LoadState};
use crate::cache::{CacheKey, ResourceBundle, ResourceStore, StoreStats};
use crate::fetch::{FetchError, ResourceFetcher};
use crate::telemetry::{self, LoadSpan, SpanExt, TelemetryStore};
use crate::usage::UsageTracker;

type LoadResult = Result<Arc<ResourceBundle>, LoadError>;
type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

/// Configuration for the load coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Bundles older than this are removed by `sweep`.
    pub ttl: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(30),
        }
    }
}

/// Loader statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadStats {
    /// Keys currently in the `Success` state.
    pub loaded_namespaces: usize,
    pub in_flight: usize,
    pub cached_bytes: usize,
    pub cached_entries: usize,
    pub hit_rate: f64,
    pub fetches: u64,
    pub failures: u64,
    pub average_fetch_ms: f64,
}

struct Inner {
    store: Mutex<ResourceStore>,
    fetcher: Arc<dyn ResourceFetcher>,
    usage: Arc<UsageTracker>,
    telemetry: Arc<TelemetryStore>,
    states: DashMap<CacheKey, LoadState>,
    pending: DashMap<CacheKey, SharedLoad>,
    current_route: RwLock<String>,
    fetches: AtomicU64,
    failures: AtomicU64,
    fetch_micros_total: AtomicU64,
}

impl Inner {
    async fn load(self: Arc<Self>, key: CacheKey) -> LoadResult {
        let locale = key.locale().to_string();
        let namespace = key.namespace().to_string();
        let span = LoadSpan::new(&locale, &namespace);

        let started = Instant::now();
        let result = self
            .fetcher
            .fetch_one(&locale, &namespace)
            .instrument(span.clone())
            .await;
        let elapsed = started.elapsed();
        let latency_ms = elapsed.as_secs_f64() * 1000.0;
        span.record("latency_ms", latency_ms);
        span.record_result(&result);

        let outcome = match result {
            Ok(bundle) => Ok(self.admit(&key, bundle, elapsed.as_micros() as u64)),
            Err(e) => {
                self.fail(&key, &e);
                Err(LoadError::from(e))
            }
        };
        self.pending.remove(&key);
        outcome
    }

    async fn join(self: Arc<Self>, key: CacheKey, task: JoinHandle<LoadResult>) -> LoadResult {
        match task.await {
            Ok(result) => result,
            Err(e) => {
                warn!(key = %key, error = %e, "Load task did not complete");
                self.pending.remove(&key);
                self.states.insert(key.clone(), LoadState::Error(e.to_string()));
                Err(LoadError::Task {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn admit(&self, key: &CacheKey, bundle: ResourceBundle, micros: u64) -> Arc<ResourceBundle> {
        let bundle = Arc::new(bundle);
        let (evicted, stats) = {
            let mut store = self.store.lock();
            let evicted = store.put(key.clone(), bundle.clone());
            (evicted, store.stats())
        };
        for k in &evicted {
            self.states.remove(k);
        }
        self.states.insert(key.clone(), LoadState::Success);
        self.record_access(key.namespace());

        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.fetch_micros_total.fetch_add(micros, Ordering::Relaxed);

        let latency_ms = micros as f64 / 1000.0;
        self.telemetry.increment_counter("loads.success", 1);
        self.telemetry.record_histogram("fetch.latency_ms", latency_ms);
        self.telemetry.set_gauge("cache.bytes", stats.total_bytes as f64);
        telemetry::metrics::record_load_success(key.namespace(), latency_ms);
        telemetry::metrics::record_cache_bytes(stats.total_bytes, stats.entry_count);
        if !evicted.is_empty() {
            self.telemetry.increment_counter("cache.evictions", evicted.len() as u64);
            telemetry::metrics::record_evictions(evicted.len());
        }

        info!(
            key = %key,
            size_bytes = bundle.size_bytes,
            version = %bundle.version_tag,
            evicted = evicted.len(),
            "Namespace loaded"
        );
        bundle
    }

    fn fail(&self, key: &CacheKey, error: &FetchError) {
        self.states.insert(key.clone(), LoadState::Error(error.to_string()));
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.telemetry.increment_counter("loads.failure", 1);
        telemetry::metrics::record_load_failure(key.namespace());
        warn!(key = %key, error = %error, "Namespace load failed");
    }

    fn record_access(&self, namespace: &str) {
        let route = self.current_route.read().clone();
        self.usage.record(namespace, &route);
    }
}

/// Coordinates bundle loads across the store and the fetcher.
///
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct LoadCoordinator {
    config: CoordinatorConfig,
    inner: Arc<Inner>,
}

impl LoadCoordinator {
    pub fn new(
        config: CoordinatorConfig,
        store: ResourceStore,
        fetcher: Arc<dyn ResourceFetcher>,
        usage: Arc<UsageTracker>,
        telemetry: Arc<TelemetryStore>,
    ) -> Self {
        Self {
            config,
            inner: Arc::new(Inner {
                store: Mutex::new(store),
                fetcher,
                usage,
                telemetry,
                states: DashMap::new(),
                pending: DashMap::new(),
                current_route: RwLock::new(String::new()),
                fetches: AtomicU64::new(0),
                failures: AtomicU64::new(0),
                fetch_micros_total: AtomicU64::new(0),
            }),
        }
    }

    /// Make sure the bundle for `(locale, namespace)` is cached.
    ///
    /// Joins an in-flight load if there is one, returns the cached bundle
    /// without a fetch if present, and otherwise starts exactly one fetch.
    pub async fn ensure_loaded(&self, namespace: &str, locale: &str) -> LoadResult {
        let key = CacheKey::new(locale, namespace);

        let load = match self.inner.pending.entry(key.clone()) {
            Entry::Occupied(entry) => {
                debug!(key = %key, "Joining in-flight load");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let cached = self.inner.store.lock().get(&key);
                if let Some(bundle) = cached {
                    self.inner.states.insert(key, LoadState::Success);
                    self.inner.telemetry.increment_counter("cache.hits", 1);
                    telemetry::metrics::record_cache_hit();
                    self.inner.record_access(namespace);
                    return Ok(bundle);
                }
                self.inner.states.insert(key.clone(), LoadState::Loading);
                // The task's own `pending.remove` waits on this shard until
                // the entry below is inserted.
                let task = tokio::spawn(self.inner.clone().load(key.clone()));
                let load = self.inner.clone().join(key, task).boxed().shared();
                entry.insert(load.clone());
                load
            }
        };

        load.await
    }

    /// Drop the cached bundle and fetch it again.
    ///
    /// If a load is already in flight the caller joins it instead.
    pub async fn reload(&self, namespace: &str, locale: &str) -> LoadResult {
        let key = CacheKey::new(locale, namespace);
        if !self.inner.pending.contains_key(&key) {
            self.inner.store.lock().delete(&key);
        }
        self.ensure_loaded(namespace, locale).await
    }

    /// Remove a bundle from the cache and reset its state to idle.
    pub fn unload(&self, namespace: &str, locale: &str) -> bool {
        let key = CacheKey::new(locale, namespace);
        let removed = self.inner.store.lock().delete(&key).is_some();
        self.inner.states.remove(&key);
        if removed {
            debug!(key = %key, "Namespace unloaded");
        }
        removed
    }

    /// Remove bundles older than the configured TTL.
    pub fn sweep(&self) -> Vec<CacheKey> {
        self.sweep_at(Utc::now())
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> Vec<CacheKey> {
        let expired = self.inner.store.lock().evict_expired_at(self.config.ttl, now);
        for key in &expired {
            self.inner.states.remove(key);
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "Swept expired bundles");
        }
        expired
    }

    /// Fire-and-forget sequential loads; failures are logged and dropped.
    pub fn preload_namespaces(&self, namespaces: Vec<String>, locale: &str) -> JoinHandle<()> {
        let coordinator = self.clone();
        let locale = locale.to_string();
        tokio::spawn(async move {
            for namespace in namespaces {
                if let Err(e) = coordinator.ensure_loaded(&namespace, &locale).await {
                    warn!(namespace = %namespace, locale = %locale, error = %e, "Idle preload failed");
                }
            }
        })
    }

    /// Look up a dotted key in a cached bundle.
    pub fn get_text(&self, dotted_key: &str, locale: &str, namespace: &str) -> Option<String> {
        let bundle = self.inner.store.lock().get(&CacheKey::new(locale, namespace))?;
        bundle.lookup(dotted_key).map(str::to_string)
    }

    /// Like [`get_text`](Self::get_text) but returns `fallback` when missing.
    pub fn get_text_or(&self, dotted_key: &str, fallback: &str, locale: &str, namespace: &str) -> String {
        self.get_text(dotted_key, locale, namespace)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn load_state(&self, namespace: &str, locale: &str) -> LoadState {
        self.inner
            .states
            .get(&CacheKey::new(locale, namespace))
            .map(|s| s.value().clone())
            .unwrap_or_default()
    }

    pub fn is_loaded(&self, namespace: &str, locale: &str) -> bool {
        self.inner.store.lock().contains(&CacheKey::new(locale, namespace))
    }

    /// Route attached to usage records from now on.
    pub fn set_route(&self, route: &str) {
        *self.inner.current_route.write() = route.to_string();
    }

    pub fn current_route(&self) -> String {
        self.inner.current_route.read().clone()
    }

    pub fn stats(&self) -> LoadStats {
        let store = self.inner.store.lock().stats();
        let fetches = self.inner.fetches.load(Ordering::Relaxed);
        let micros = self.inner.fetch_micros_total.load(Ordering::Relaxed);
        LoadStats {
            loaded_namespaces: self
                .inner
                .states
                .iter()
                .filter(|s| *s.value() == LoadState::Success)
                .count(),
            in_flight: self.inner.pending.len(),
            cached_bytes: store.total_bytes,
            cached_entries: store.entry_count,
            hit_rate: store.hit_rate,
            fetches,
            failures: self.inner.failures.load(Ordering::Relaxed),
            average_fetch_ms: if fetches == 0 {
                0.0
            } else {
                micros as f64 / fetches as f64 / 1000.0
            },
        }
    }

    pub fn store_stats(&self) -> StoreStats {
        self.inner.store.lock().stats()
    }

    pub fn usage(&self) -> &Arc<UsageTracker> {
        &self.inner.usage
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }
}
