//! Resource store benchmarks.
//!
//! Measures admission under eviction pressure and hit-path lookups.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

use lexiload::cache::{CacheKey, ResourceBundle, ResourceStore, StoreConfig};

fn bundle(size: usize) -> Arc<ResourceBundle> {
    Arc::new(ResourceBundle::new(json!({"title": "bench"}), size, "v1"))
}

fn bench_put_with_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_put_evicting");

    for (name, bundle_size) in [("1kb", 1024usize), ("16kb", 16 * 1024), ("256kb", 256 * 1024)] {
        let mut store = ResourceStore::new(StoreConfig {
            max_bytes: 1024 * 1024,
        });
        let keys: Vec<CacheKey> = (0..512).map(|i| CacheKey::new("en", &format!("ns{i}"))).collect();
        let payload = bundle(bundle_size);
        let mut next = 0usize;

        group.throughput(Throughput::Bytes(bundle_size as u64));
        group.bench_function(BenchmarkId::new("put", name), |b| {
            b.iter(|| {
                let key = keys[next % keys.len()].clone();
                next += 1;
                black_box(store.put(key, payload.clone()))
            })
        });
    }

    group.finish();
}

fn bench_get_hit(c: &mut Criterion) {
    let mut store = ResourceStore::new(StoreConfig::default());
    let keys: Vec<CacheKey> = (0..256).map(|i| CacheKey::new("zh-CN", &format!("ns{i}"))).collect();
    for key in &keys {
        store.put(key.clone(), bundle(512));
    }
    let mut next = 0usize;

    c.bench_function("store_get_hit", |b| {
        b.iter(|| {
            let key = &keys[next % keys.len()];
            next += 1;
            black_box(store.get(black_box(key)))
        })
    });
}

criterion_group!(benches, bench_put_with_eviction, bench_get_hit);
criterion_main!(benches);
