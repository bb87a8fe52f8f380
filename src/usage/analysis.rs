//! Optimization hints and whole-catalog usage analysis.

use serde::{Deserialize, Serialize};

use super::tracker::{UsageRecord, UsageTracker};
use crate::catalog::NamespaceGraph;

/// Kind of change a suggestion proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// Rarely used; lower its priority or load on demand.
    Demote,
    /// Never used; remove it or defer loading.
    Defer,
    /// Heavily used; raise its priority or load it up front.
    Promote,
}

/// Expected effect of acting on a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    pub kind: SuggestionKind,
    pub namespace: String,
    pub reason: String,
    pub impact: Impact,
    pub recommendation: String,
}

/// Snapshot combining catalog shape with observed usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceAnalysis {
    pub total_size: u64,
    pub critical_path: Vec<String>,
    pub optimized_load_order: Vec<String>,
    pub unused_namespaces: Vec<String>,
    pub suggestions: Vec<OptimizationSuggestion>,
    pub usage: Vec<UsageRecord>,
}

/// Analyze catalog usage.
pub fn analyze_usage(graph: &NamespaceGraph, tracker: &UsageTracker, authenticated: bool) -> NamespaceAnalysis {
    let usage = tracker.usage_stats();
    let unused_namespaces = graph
        .names()
        .into_iter()
        .filter(|name| !usage.iter().any(|r| &r.namespace == name))
        .collect();

    NamespaceAnalysis {
        total_size: graph.total_estimated_size(),
        critical_path: graph.critical_path(authenticated),
        optimized_load_order: graph.optimized_load_order(authenticated),
        unused_namespaces,
        suggestions: tracker.suggest_optimizations(),
        usage,
    }
}
