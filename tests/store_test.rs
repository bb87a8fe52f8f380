//! Resource store tests: LRU order, byte budget and expiry.

use std::sync::Arc;

use chrono::{Duration, Utc};
use proptest::prelude::*;
use serde_json::json;

use lexiload::cache::{CacheKey, ResourceBundle, ResourceStore, StoreConfig};

fn bundle(size: usize) -> Arc<ResourceBundle> {
    Arc::new(ResourceBundle::new(json!({"greeting": "hi"}), size, "v1"))
}

fn store(max_bytes: usize) -> ResourceStore {
    ResourceStore::new(StoreConfig { max_bytes })
}

fn key(ns: &str) -> CacheKey {
    CacheKey::new("en", ns)
}

#[test]
fn second_bundle_over_budget_evicts_first() {
    let mut s = store(100);
    assert!(s.put(key("a"), bundle(60)).is_empty());
    let evicted = s.put(key("b"), bundle(60));

    assert_eq!(evicted, vec![key("a")]);
    assert!(s.get(&key("a")).is_none());
    assert!(s.get(&key("b")).is_some());
    assert_eq!(s.total_bytes(), 60);
}

#[test]
fn get_promotes_to_most_recent() {
    let mut s = store(300);
    s.put(key("a"), bundle(100));
    s.put(key("b"), bundle(100));
    s.put(key("c"), bundle(100));
    s.get(&key("a"));

    let evicted = s.put(key("d"), bundle(100));
    assert_eq!(evicted, vec![key("b")]);
    assert_eq!(s.keys_by_recency(), vec![key("c"), key("a"), key("d")]);
}

#[test]
fn contains_does_not_promote() {
    let mut s = store(200);
    s.put(key("a"), bundle(100));
    s.put(key("b"), bundle(100));
    assert!(s.contains(&key("a")));

    let evicted = s.put(key("c"), bundle(100));
    assert_eq!(evicted, vec![key("a")]);
}

#[test]
fn oversized_bundle_is_admitted_alone() {
    let mut s = store(100);
    s.put(key("a"), bundle(30));
    s.put(key("b"), bundle(30));

    let evicted = s.put(key("huge"), bundle(500));
    assert_eq!(evicted.len(), 2);
    assert_eq!(s.len(), 1);
    assert_eq!(s.total_bytes(), 500);
    assert!(s.contains(&key("huge")));
}

#[test]
fn grown_replacement_evicts_others_not_itself() {
    let mut s = store(100);
    s.put(key("a"), bundle(40));
    s.put(key("b"), bundle(40));

    let evicted = s.put(key("b"), bundle(90));
    assert_eq!(evicted, vec![key("a")]);
    assert_eq!(s.total_bytes(), 90);
    assert!(s.contains(&key("b")));
}

#[test]
fn delete_and_clear_release_bytes() {
    let mut s = store(100);
    s.put(key("a"), bundle(30));
    s.put(key("b"), bundle(30));

    assert!(s.delete(&key("a")).is_some());
    assert!(s.delete(&key("a")).is_none());
    assert_eq!(s.total_bytes(), 30);

    s.clear();
    assert!(s.is_empty());
    assert_eq!(s.total_bytes(), 0);
}

#[test]
fn stats_track_hits_misses_and_evictions() {
    let mut s = store(100);
    s.put(key("a"), bundle(60));
    s.get(&key("a"));
    s.get(&key("missing"));
    s.put(key("b"), bundle(60));

    let stats = s.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.evictions, 1);
    assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
    assert_eq!(stats.max_bytes, 100);
}

#[test]
fn expired_bundles_are_swept() {
    let mut s = store(1000);
    let now = Utc::now();
    let old = ResourceBundle::with_timestamp(json!({}), 10, "old", now - Duration::minutes(45));
    s.put(key("old"), Arc::new(old));
    s.put(key("fresh"), bundle(10));

    let expired = s.evict_expired_at(Duration::minutes(30), now);
    assert_eq!(expired, vec![key("old")]);
    assert_eq!(s.len(), 1);
    assert_eq!(s.total_bytes(), 10);
}

proptest! {
    #[test]
    fn budget_holds_after_any_put_sequence(
        ops in prop::collection::vec((0usize..12, 1usize..700), 1..80),
    ) {
        let max_bytes = 500;
        let mut s = store(max_bytes);
        for (ns, size) in ops {
            s.put(key(&format!("ns{ns}")), bundle(size));

            let stats = s.stats();
            if stats.total_bytes > max_bytes {
                // Only a lone oversized bundle may exceed the budget.
                prop_assert_eq!(stats.entry_count, 1);
            }
            prop_assert_eq!(s.keys_by_recency().len(), stats.entry_count);
        }
    }
}
