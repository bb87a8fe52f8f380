//! lexiload
//!
//! Client-side cache and predictive prefetch scheduler for localized resource
//! bundles. Resources are grouped into namespaces with dependencies,
//! priorities and route patterns; each `(locale, namespace)` bundle is fetched
//! once, held in a size-bounded LRU cache, and loaded ahead of need based on
//! startup requirements, navigation, viewport visibility and predicted user
//! behavior.
//!
//! # Layers
//!
//! - `cache`: size-bounded LRU store of bundles
//! - `fetch`: the transport seam and its HTTP implementation
//! - `loader`: deduplicating load coordinator over store and fetcher
//! - `catalog`: namespace graph, critical path and load ordering
//! - `usage` / `predict`: usage scoring and next-route prediction
//! - `preload`: the orchestrator deciding what to load and when
//!
//! Nothing here is a global. [`Runtime::new`] wires one instance of each
//! component; hosts that need a different arrangement construct them
//! directly.

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod loader;
pub mod predict;
pub mod preload;
pub mod telemetry;
pub mod usage;

use std::sync::Arc;

use cache::{ResourceStore, StoreConfig};
use catalog::NamespaceGraph;
use fetch::ResourceFetcher;
use loader::{CoordinatorConfig, LoadCoordinator};
use predict::PredictionConfig;
use preload::{PreloadConfig, PreloadOrchestrator};
use telemetry::TelemetryStore;
use usage::{UsageConfig, UsageTracker};

/// Runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub store: StoreConfig,
    pub coordinator: CoordinatorConfig,
    pub preload: PreloadConfig,
    pub prediction: PredictionConfig,
    pub usage: UsageConfig,
}

impl From<&config::EnvConfig> for RuntimeConfig {
    fn from(env: &config::EnvConfig) -> Self {
        Self {
            store: env.store.clone(),
            coordinator: env.coordinator.clone(),
            preload: env.preload.clone(),
            ..Default::default()
        }
    }
}

/// One wired set of components sharing a store, tracker and telemetry.
pub struct Runtime {
    pub graph: Arc<NamespaceGraph>,
    pub telemetry: Arc<TelemetryStore>,
    pub usage: Arc<UsageTracker>,
    pub coordinator: LoadCoordinator,
    pub orchestrator: Arc<PreloadOrchestrator>,
}

impl Runtime {
    /// Create a new runtime over `graph`, fetching through `fetcher`.
    pub fn new(config: RuntimeConfig, graph: NamespaceGraph, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        let graph = Arc::new(graph);
        let telemetry = Arc::new(TelemetryStore::new());
        let usage = Arc::new(UsageTracker::new(config.usage, graph.names()));
        let coordinator = LoadCoordinator::new(
            config.coordinator,
            ResourceStore::new(config.store),
            fetcher,
            usage.clone(),
            telemetry.clone(),
        );
        let orchestrator = Arc::new(PreloadOrchestrator::new(
            config.preload,
            graph.clone(),
            coordinator.clone(),
            config.prediction,
            telemetry.clone(),
        ));

        Self {
            graph,
            telemetry,
            usage,
            coordinator,
            orchestrator,
        }
    }
}
