//! Size-bounded, recency-ordered bundle store.
//!
//! Entries are evicted least-recently-used first whenever admitting a bundle
//! would push total bytes past the budget. A bundle larger than the whole
//! budget is still admitted, alone, after everything else has been evicted.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::bundle::{CacheKey, ResourceBundle};

/// Configuration for the resource store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Byte budget across all cached bundles.
    pub max_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Point-in-time store statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_bytes: usize,
    pub entry_count: usize,
    pub max_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
}

struct StoreEntry {
    bundle: Arc<ResourceBundle>,
    tick: u64,
}

/// LRU bundle store.
///
/// Recency is a monotonically increasing access tick; `recency` maps each
/// live tick back to its key so the oldest entry is always the first one.
pub struct ResourceStore {
    entries: HashMap<CacheKey, StoreEntry>,
    recency: BTreeMap<u64, CacheKey>,
    next_tick: u64,
    total_bytes: usize,
    max_bytes: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl ResourceStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            next_tick: 0,
            total_bytes: 0,
            max_bytes: config.max_bytes,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Fetch a bundle and promote it to most-recently-used.
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<ResourceBundle>> {
        let tick = self.bump_tick();
        match self.entries.get_mut(key) {
            Some(entry) => {
                self.recency.remove(&entry.tick);
                entry.tick = tick;
                self.recency.insert(tick, key.clone());
                self.hits += 1;
                Some(entry.bundle.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Check presence without touching recency or hit counters.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace a bundle. Returns the keys evicted to make room.
    pub fn put(&mut self, key: CacheKey, bundle: Arc<ResourceBundle>) -> Vec<CacheKey> {
        let size = bundle.size_bytes;
        let tick = self.bump_tick();

        if let Some(entry) = self.entries.get_mut(&key) {
            self.total_bytes = self.total_bytes - entry.bundle.size_bytes + size;
            self.recency.remove(&entry.tick);
            entry.bundle = bundle;
            entry.tick = tick;
            self.recency.insert(tick, key.clone());
            // A grown replacement may push others out, never itself.
            return self.evict_until_fits(0, Some(&key));
        }

        let evicted = self.evict_until_fits(size, None);
        if size > self.max_bytes {
            tracing::warn!(
                key = %key,
                size_bytes = size,
                max_bytes = self.max_bytes,
                "Bundle exceeds cache budget; admitting it alone"
            );
        }

        self.total_bytes += size;
        self.recency.insert(tick, key.clone());
        self.entries.insert(key, StoreEntry { bundle, tick });
        evicted
    }

    /// Remove a bundle.
    pub fn delete(&mut self, key: &CacheKey) -> Option<Arc<ResourceBundle>> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(&entry.tick);
        self.total_bytes -= entry.bundle.size_bytes;
        Some(entry.bundle)
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
        self.total_bytes = 0;
    }

    /// Remove bundles whose `loaded_at` is older than `ttl`.
    pub fn evict_expired_at(&mut self, ttl: Duration, now: DateTime<Utc>) -> Vec<CacheKey> {
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.bundle.is_expired_at(ttl, now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            self.delete(key);
        }
        expired
    }

    /// Keys ordered least- to most-recently used.
    pub fn keys_by_recency(&self) -> Vec<CacheKey> {
        self.recency.values().cloned().collect()
    }

    pub fn stats(&self) -> StoreStats {
        let lookups = self.hits + self.misses;
        StoreStats {
            total_bytes: self.total_bytes,
            entry_count: self.entries.len(),
            max_bytes: self.max_bytes,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
        }
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn bump_tick(&mut self) -> u64 {
        self.next_tick += 1;
        self.next_tick
    }

    /// Evict LRU entries until `total + incoming <= max`, skipping `keep`.
    fn evict_until_fits(&mut self, incoming: usize, keep: Option<&CacheKey>) -> Vec<CacheKey> {
        let mut evicted = Vec::new();
        while self.total_bytes + incoming > self.max_bytes {
            let victim = self
                .recency
                .values()
                .find(|k| Some(*k) != keep)
                .cloned();
            let Some(victim) = victim else { break };
            if let Some(entry) = self.entries.remove(&victim) {
                self.recency.remove(&entry.tick);
                self.total_bytes -= entry.bundle.size_bytes;
                self.evictions += 1;
                tracing::debug!(key = %victim, size_bytes = entry.bundle.size_bytes, "Evicted bundle");
            }
            evicted.push(victim);
        }
        evicted
    }
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
