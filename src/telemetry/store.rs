//! In-process telemetry store.
//!
//! Complements the `metrics` facade: values recorded here can be read back
//! through [`TelemetryStore::snapshot`] without an exporter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Summary statistics for a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramSummary {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl HistogramSummary {
    fn first(value: f64) -> Self {
        Self {
            count: 1,
            sum: value,
            min: value,
            max: value,
        }
    }

    fn observe(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Snapshot of all telemetry at a point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: HashMap<String, u64>,
    pub gauges: HashMap<String, f64>,
    pub histograms: HashMap<String, HistogramSummary>,
}

/// Thread-safe counters, gauges and histogram summaries.
#[derive(Default)]
pub struct TelemetryStore {
    counters: DashMap<String, AtomicU64>,
    gauges: DashMap<String, f64>,
    histograms: DashMap<String, HistogramSummary>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_counter(&self, name: &str, value: u64) {
        if let Some(counter) = self.counters.get(name) {
            counter.fetch_add(value, Ordering::Relaxed);
            return;
        }
        self.counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(value, Ordering::Relaxed);
    }

    pub fn set_gauge(&self, name: &str, value: f64) {
        self.gauges.insert(name.to_string(), value);
    }

    pub fn record_histogram(&self, name: &str, value: f64) {
        self.histograms
            .entry(name.to_string())
            .and_modify(|h| h.observe(value))
            .or_insert_with(|| HistogramSummary::first(value));
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.gauges.get(name).map(|g| *g)
    }

    pub fn histogram(&self, name: &str) -> Option<HistogramSummary> {
        self.histograms.get(name).map(|h| *h)
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            counters: self
                .counters
                .iter()
                .map(|e| (e.key().clone(), e.value().load(Ordering::Relaxed)))
                .collect(),
            gauges: self.gauges.iter().map(|e| (e.key().clone(), *e.value())).collect(),
            histograms: self.histograms.iter().map(|e| (e.key().clone(), *e.value())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let store = TelemetryStore::new();
        store.increment_counter("loads.success", 1);
        store.increment_counter("loads.success", 2);
        assert_eq!(store.counter("loads.success"), 3);
        assert_eq!(store.counter("missing"), 0);
    }

    #[test]
    fn test_histogram_summary() {
        let store = TelemetryStore::new();
        for v in [10.0, 20.0, 30.0] {
            store.record_histogram("fetch.latency_ms", v);
        }
        let h = store.histogram("fetch.latency_ms").unwrap();
        assert_eq!(h.count, 3);
        assert_eq!(h.min, 10.0);
        assert_eq!(h.max, 30.0);
        assert!((h.mean() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_serializes() {
        let store = TelemetryStore::new();
        store.increment_counter("a", 1);
        store.set_gauge("cache.bytes", 42.0);
        store.record_histogram("h", 1.0);
        let json = serde_json::to_string(&store.snapshot()).unwrap();
        assert!(json.contains("cache.bytes"));
    }
}
