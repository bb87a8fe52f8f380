//! Namespace usage tracking, impact scoring and optimization hints.

mod analysis;
mod tracker;

pub use analysis::{analyze_usage, Impact, NamespaceAnalysis, OptimizationSuggestion, SuggestionKind};
pub use tracker::{impact_score, UsageConfig, UsageRecord, UsageTracker};
