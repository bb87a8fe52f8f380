//! Per-namespace access tracking and impact scoring.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::analysis::{Impact, OptimizationSuggestion, SuggestionKind};

/// Configuration for usage tracking.
#[derive(Debug, Clone)]
pub struct UsageConfig {
    /// Maximum distinct routes remembered per namespace (oldest dropped).
    pub max_routes: usize,
    /// Records idle longer than this are pruned.
    pub retention: Duration,
    /// Recency contribution decays linearly to zero over this window.
    pub recency_window: Duration,
    /// Access counts below this suggest demotion.
    pub low_frequency_threshold: u64,
    /// Access counts above this suggest promotion.
    pub high_frequency_threshold: u64,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            max_routes: 20,
            retention: Duration::hours(24),
            recency_window: Duration::days(7),
            low_frequency_threshold: 2,
            high_frequency_threshold: 10,
        }
    }
}

/// Usage of one namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub namespace: String,
    pub access_count: u64,
    pub last_accessed: DateTime<Utc>,
    pub routes_seen: VecDeque<String>,
    pub impact_score: f64,
}

/// Compute an impact score in `0.0..=100.0`.
///
/// `(recency * 0.4 + frequency * 0.4 + coverage * 0.2) * 100` where recency
/// decays linearly over `window`, frequency saturates at 10 accesses and
/// coverage at 5 distinct routes.
pub fn impact_score(record: &UsageRecord, window: Duration, now: DateTime<Utc>) -> f64 {
    let age_ms = (now - record.last_accessed).num_milliseconds().max(0) as f64;
    let window_ms = window.num_milliseconds().max(1) as f64;
    let recency = (1.0 - age_ms / window_ms).max(0.0);
    let frequency = (record.access_count as f64 / 10.0).min(1.0);
    let coverage = (record.routes_seen.len() as f64 / 5.0).min(1.0);
    (recency * 0.4 + frequency * 0.4 + coverage * 0.2) * 100.0
}

/// Thread-safe usage tracker.
pub struct UsageTracker {
    config: UsageConfig,
    catalog: Vec<String>,
    records: RwLock<HashMap<String, UsageRecord>>,
}

impl UsageTracker {
    /// `catalog` lists every known namespace, for never-used detection.
    pub fn new(config: UsageConfig, catalog: Vec<String>) -> Self {
        Self {
            config,
            catalog,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Record one access of `namespace` while on `route`.
    pub fn record(&self, namespace: &str, route: &str) {
        self.record_at(namespace, route, Utc::now());
    }

    pub fn record_at(&self, namespace: &str, route: &str, now: DateTime<Utc>) {
        let mut records = self.records.write();
        let record = records
            .entry(namespace.to_string())
            .or_insert_with(|| UsageRecord {
                namespace: namespace.to_string(),
                access_count: 0,
                last_accessed: now,
                routes_seen: VecDeque::new(),
                impact_score: 0.0,
            });

        record.access_count += 1;
        record.last_accessed = now;
        if !route.is_empty() && !record.routes_seen.iter().any(|r| r == route) {
            record.routes_seen.push_back(route.to_string());
            while record.routes_seen.len() > self.config.max_routes {
                record.routes_seen.pop_front();
            }
        }
        record.impact_score = impact_score(record, self.config.recency_window, now);
    }

    pub fn get(&self, namespace: &str) -> Option<UsageRecord> {
        self.records.read().get(namespace).cloned()
    }

    /// All records, highest impact first.
    pub fn usage_stats(&self) -> Vec<UsageRecord> {
        let mut stats: Vec<UsageRecord> = self.records.read().values().cloned().collect();
        stats.sort_by(|a, b| {
            b.impact_score
                .total_cmp(&a.impact_score)
                .then_with(|| a.namespace.cmp(&b.namespace))
        });
        stats
    }

    /// Demotion hints for rarely used namespaces, defer hints for catalog
    /// namespaces never accessed, promotion hints for heavily used ones.
    pub fn suggest_optimizations(&self) -> Vec<OptimizationSuggestion> {
        let records = self.records.read();
        let mut by_name: Vec<&UsageRecord> = records.values().collect();
        by_name.sort_by(|a, b| a.namespace.cmp(&b.namespace));

        let mut suggestions = Vec::new();

        for r in by_name.iter().filter(|r| r.access_count < self.config.low_frequency_threshold) {
            suggestions.push(OptimizationSuggestion {
                kind: SuggestionKind::Demote,
                namespace: r.namespace.clone(),
                reason: format!("namespace {} is rarely used ({} accesses)", r.namespace, r.access_count),
                impact: Impact::Low,
                recommendation: "lower its load priority or load it on demand".to_string(),
            });
        }

        for name in self.catalog.iter().filter(|n| !records.contains_key(n.as_str())) {
            suggestions.push(OptimizationSuggestion {
                kind: SuggestionKind::Defer,
                namespace: name.clone(),
                reason: format!("namespace {} has not been used", name),
                impact: Impact::Medium,
                recommendation: "remove it or defer loading".to_string(),
            });
        }

        for r in by_name.iter().filter(|r| r.access_count > self.config.high_frequency_threshold) {
            suggestions.push(OptimizationSuggestion {
                kind: SuggestionKind::Promote,
                namespace: r.namespace.clone(),
                reason: format!("namespace {} is heavily used ({} accesses)", r.namespace, r.access_count),
                impact: Impact::High,
                recommendation: "raise its load priority or add it to the initial load".to_string(),
            });
        }

        suggestions
    }

    /// Drop records idle past the retention window. Returns how many.
    pub fn prune(&self) -> usize {
        self.prune_at(Utc::now())
    }

    pub fn prune_at(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.config.retention;
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|_, r| r.last_accessed >= cutoff);
        before - records.len()
    }

    pub fn reset(&self) {
        self.records.write().clear();
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn config(&self) -> &UsageConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> UsageTracker {
        UsageTracker::new(UsageConfig::default(), vec!["common".into(), "wallet".into()])
    }

    #[test]
    fn test_record_increments_and_collects_routes() {
        let t = tracker();
        t.record("common", "/");
        t.record("common", "/orders");
        t.record("common", "/orders");
        let r = t.get("common").unwrap();
        assert_eq!(r.access_count, 3);
        assert_eq!(r.routes_seen, VecDeque::from(vec!["/".to_string(), "/orders".to_string()]));
    }

    #[test]
    fn test_routes_bounded_oldest_dropped() {
        let t = UsageTracker::new(
            UsageConfig {
                max_routes: 2,
                ..Default::default()
            },
            vec![],
        );
        t.record("common", "/a");
        t.record("common", "/b");
        t.record("common", "/c");
        let r = t.get("common").unwrap();
        assert_eq!(r.routes_seen, VecDeque::from(vec!["/b".to_string(), "/c".to_string()]));
    }

    #[test]
    fn test_impact_score_fresh_single_access() {
        let t = tracker();
        let now = Utc::now();
        t.record_at("common", "/", now);
        // recency 1.0, frequency 0.1, coverage 0.2
        let expected = (0.4 + 0.04 + 0.04) * 100.0;
        assert!((t.get("common").unwrap().impact_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_impact_score_recency_decays() {
        let now = Utc::now();
        let record = UsageRecord {
            namespace: "x".into(),
            access_count: 10,
            last_accessed: now - Duration::days(7),
            routes_seen: (0..5).map(|i| format!("/{i}")).collect(),
            impact_score: 0.0,
        };
        let score = impact_score(&record, Duration::days(7), now);
        assert!((score - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_suggestions() {
        let t = tracker();
        t.record("common", "/");
        for _ in 0..11 {
            t.record("orders", "/orders");
        }
        let s = t.suggest_optimizations();
        assert!(s.iter().any(|x| x.namespace == "common" && x.kind == SuggestionKind::Demote));
        assert!(s.iter().any(|x| x.namespace == "wallet" && x.kind == SuggestionKind::Defer));
        assert!(s.iter().any(|x| x.namespace == "orders" && x.kind == SuggestionKind::Promote));
        assert!(!s.iter().any(|x| x.namespace == "orders" && x.kind == SuggestionKind::Demote));
    }

    #[test]
    fn test_prune_and_reset() {
        let t = tracker();
        let now = Utc::now();
        t.record_at("common", "/", now - Duration::hours(25));
        t.record_at("wallet", "/wallet", now);
        assert_eq!(t.prune_at(now), 1);
        assert!(t.get("common").is_none());
        t.reset();
        assert!(t.is_empty());
    }
}
