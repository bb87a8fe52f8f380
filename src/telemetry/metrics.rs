//! `metrics` facade helpers.
//!
//! These are no-ops until the host installs a recorder.

use ::metrics::{counter, gauge, histogram};

pub fn record_load_success(namespace: &str, latency_ms: f64) {
    counter!("lexiload_loads_total", "outcome" => "success").increment(1);
    histogram!("lexiload_fetch_latency_ms", "namespace" => namespace.to_string()).record(latency_ms);
}

pub fn record_load_failure(namespace: &str) {
    counter!("lexiload_loads_total", "outcome" => "failure").increment(1);
    counter!("lexiload_load_failures_total", "namespace" => namespace.to_string()).increment(1);
}

pub fn record_cache_hit() {
    counter!("lexiload_cache_hits_total").increment(1);
}

pub fn record_cache_bytes(total_bytes: usize, entries: usize) {
    gauge!("lexiload_cache_bytes").set(total_bytes as f64);
    gauge!("lexiload_cache_entries").set(entries as f64);
}

pub fn record_evictions(count: usize) {
    counter!("lexiload_cache_evictions_total").increment(count as u64);
}

pub fn record_prediction(confidence: u8, acted: bool) {
    histogram!("lexiload_prediction_confidence").record(f64::from(confidence));
    if acted {
        counter!("lexiload_prefetches_triggered_total").increment(1);
    }
}
