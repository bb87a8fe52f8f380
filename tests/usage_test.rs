//! Usage tracker tests: scoring, suggestions, retention and analysis.

mod common;

use chrono::{Duration, Utc};

use lexiload::usage::{analyze_usage, impact_score, Impact, SuggestionKind, UsageConfig, UsageTracker};

fn tracker(catalog: &[&str]) -> UsageTracker {
    UsageTracker::new(
        UsageConfig::default(),
        catalog.iter().map(|s| s.to_string()).collect(),
    )
}

#[test]
fn impact_combines_recency_frequency_and_coverage() {
    let t = tracker(&["orders"]);
    let now = Utc::now();
    for i in 0..5 {
        t.record_at("orders", &format!("/orders/{i}"), now);
    }

    let record = t.get("orders").unwrap();
    assert_eq!(record.access_count, 5);
    // recency 1.0*0.4 + freq 0.5*0.4 + coverage 1.0*0.2 = 0.8
    assert!((record.impact_score - 80.0).abs() < 1e-9);

    let week_later = now + Duration::days(7);
    let stale = impact_score(&record, t.config().recency_window, week_later);
    // Recency decayed to zero.
    assert!((stale - 40.0).abs() < 1e-9);
}

#[test]
fn routes_are_distinct_and_bounded() {
    let t = tracker(&["feed"]);
    let now = Utc::now();
    t.record_at("feed", "/feed", now);
    t.record_at("feed", "/feed", now);
    for i in 0..30 {
        t.record_at("feed", &format!("/feed/{i}"), now);
    }

    let record = t.get("feed").unwrap();
    assert_eq!(record.access_count, 32);
    assert_eq!(record.routes_seen.len(), 20);
    assert_eq!(record.routes_seen.back().map(String::as_str), Some("/feed/29"));
}

#[test]
fn usage_stats_are_sorted_by_impact() {
    let t = tracker(&["a", "b"]);
    let now = Utc::now();
    t.record_at("a", "/a", now);
    for _ in 0..6 {
        t.record_at("b", "/b", now);
    }

    let stats = t.usage_stats();
    assert_eq!(stats[0].namespace, "b");
    assert_eq!(stats[1].namespace, "a");
}

#[test]
fn suggestions_cover_rare_unused_and_hot_namespaces() {
    let t = tracker(&["rare", "hot", "never", "steady"]);
    let now = Utc::now();
    t.record_at("rare", "/rare", now);
    for _ in 0..11 {
        t.record_at("hot", "/hot", now);
    }
    for _ in 0..5 {
        t.record_at("steady", "/steady", now);
    }

    let suggestions = t.suggest_optimizations();
    let find = |ns: &str| suggestions.iter().find(|s| s.namespace == ns);

    let rare = find("rare").unwrap();
    assert_eq!(rare.kind, SuggestionKind::Demote);
    assert_eq!(rare.impact, Impact::Low);

    let never = find("never").unwrap();
    assert_eq!(never.kind, SuggestionKind::Defer);
    assert_eq!(never.impact, Impact::Medium);

    let hot = find("hot").unwrap();
    assert_eq!(hot.kind, SuggestionKind::Promote);
    assert_eq!(hot.impact, Impact::High);

    assert!(find("steady").is_none());
    assert_eq!(suggestions.len(), 3);
}

#[test]
fn prune_drops_records_past_retention() {
    let t = tracker(&["old", "new"]);
    let now = Utc::now();
    t.record_at("old", "/", now - Duration::hours(25));
    t.record_at("new", "/", now);

    assert_eq!(t.prune_at(now), 1);
    assert!(t.get("old").is_none());
    assert!(t.get("new").is_some());

    t.reset();
    assert!(t.is_empty());
}

#[test]
fn analysis_combines_catalog_and_usage() {
    let graph = common::graph(common::ADMIN_CATALOG);
    let t = UsageTracker::new(UsageConfig::default(), graph.names());
    t.record("common", "/");
    t.record("admin", "/admin");

    let analysis = analyze_usage(&graph, &t, true);
    assert_eq!(analysis.total_size, 2300);
    assert_eq!(analysis.critical_path, vec!["common", "auth"]);
    assert_eq!(analysis.optimized_load_order, vec!["common", "auth", "admin"]);
    assert_eq!(analysis.unused_namespaces, vec!["auth"]);
    assert_eq!(analysis.usage.len(), 2);
}
