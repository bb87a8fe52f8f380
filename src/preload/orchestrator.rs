//! Preload orchestration.
//!
//! Decides *what* to load and *when*: the critical path at startup, route
//! namespaces on navigation, viewport targets on first intersection and
//! predicted routes once interaction settles. Loading itself is delegated to
//! the [`LoadCoordinator`].

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::PreloadError;
use super::viewport::ViewportRegistry;
use crate::cache::CacheKey;
use crate::catalog::NamespaceGraph;
use crate::loader::{LoadCoordinator, LoadStats};
use crate::predict::{Interaction, PredictionAnalytics, PredictionConfig, PredictionEngine, PredictionSnapshot};
use crate::telemetry::{self, TelemetryStore};
use crate::usage::{analyze_usage, NamespaceAnalysis};

/// Orchestrator scheduling knobs.
#[derive(Debug, Clone)]
pub struct PreloadConfig {
    /// Locale every orchestrated load uses.
    pub locale: String,
    pub batch_size: usize,
    /// Pause between route batches.
    pub batch_delay: Duration,
    /// Prediction must score strictly above this to trigger prefetching.
    pub confidence_threshold: u8,
    /// Quiet period after the last interaction before predicting.
    pub debounce: Duration,
    /// Gap between consecutive idle-priority loads.
    pub idle_stagger: Duration,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            locale: "zh-CN".to_string(),
            batch_size: 3,
            batch_delay: Duration::from_millis(10),
            confidence_threshold: 60,
            debounce: Duration::from_millis(300),
            idle_stagger: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupReport {
    /// Critical namespaces in the order they were loaded.
    pub loaded: Vec<String>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePreloadReport {
    pub route: String,
    pub batches: Vec<Vec<String>>,
    pub loaded: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub snapshot: PredictionSnapshot,
    /// Whether the snapshot cleared the threshold.
    pub acted: bool,
    /// Non-critical namespaces scheduled for idle loading.
    pub scheduled: Vec<String>,
    pub loaded: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub expired: Vec<CacheKey>,
    pub pruned_usage: usize,
    pub pruned_events: usize,
}

/// Read-only view of the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreloadSnapshot {
    pub ready: bool,
    pub authenticated: bool,
    pub locale: String,
    pub current_route: String,
    /// Catalog namespaces currently cached for the orchestrator locale.
    pub loaded_namespaces: Vec<String>,
    pub last_prediction: Option<PredictionSnapshot>,
    pub startup_ms: Option<u64>,
    pub analytics: PredictionAnalytics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreloadStats {
    pub total_namespaces: usize,
    pub loaded_namespaces: usize,
    pub loader: LoadStats,
    pub predictions: u64,
    pub predictions_acted: u64,
}

#[derive(Debug, Default)]
struct OrchestratorState {
    ready: bool,
    startup_ms: Option<u64>,
    last_prediction: Option<PredictionSnapshot>,
}

pub struct PreloadOrchestrator {
    config: PreloadConfig,
    graph: Arc<NamespaceGraph>,
    coordinator: LoadCoordinator,
    prediction: Mutex<PredictionEngine>,
    viewport: Mutex<ViewportRegistry>,
    authenticated: AtomicBool,
    interaction_epoch: AtomicU64,
    state: RwLock<OrchestratorState>,
    telemetry: Arc<TelemetryStore>,
}

impl PreloadOrchestrator {
    pub fn new(
        config: PreloadConfig,
        graph: Arc<NamespaceGraph>,
        coordinator: LoadCoordinator,
        prediction: PredictionConfig,
        telemetry: Arc<TelemetryStore>,
    ) -> Self {
        Self {
            config,
            graph,
            coordinator,
            prediction: Mutex::new(PredictionEngine::new(prediction)),
            viewport: Mutex::new(ViewportRegistry::new()),
            authenticated: AtomicBool::new(false),
            interaction_epoch: AtomicU64::new(0),
            state: RwLock::new(OrchestratorState::default()),
            telemetry,
        }
    }

    /// Set the authentication signal. Affects critical-path membership of
    /// the auth namespace from the next decision on.
    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::Relaxed);
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Relaxed)
    }

    pub fn is_ready(&self) -> bool {
        self.state.read().ready
    }

    /// Load the critical path sequentially, in declared order.
    ///
    /// The first failure aborts startup and is returned; the orchestrator
    /// stays not-ready and `start` may be called again.
    pub async fn start(&self) -> Result<StartupReport, PreloadError> {
        let started = Instant::now();
        let path = self.graph.critical_path(self.is_authenticated());
        info!(locale = %self.config.locale, namespaces = ?path, "Loading critical path");

        let mut loaded = Vec::with_capacity(path.len());
        for namespace in path {
            self.coordinator
                .ensure_loaded(&namespace, &self.config.locale)
                .await
                .map_err(|source| PreloadError::CriticalLoadFailed {
                    namespace: namespace.clone(),
                    source,
                })?;
            loaded.push(namespace);
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        {
            let mut state = self.state.write();
            state.ready = true;
            state.startup_ms = Some(elapsed_ms);
        }
        self.telemetry.record_histogram("startup.ms", elapsed_ms as f64);
        info!(count = loaded.len(), elapsed_ms, "Critical path loaded");

        Ok(StartupReport { loaded, elapsed_ms })
    }

    /// Navigation: remember the route and preload what it needs.
    pub async fn on_route_change(&self, route: &str) -> RoutePreloadReport {
        self.coordinator.set_route(route);
        self.prediction.lock().record_route_at(route, Utc::now());
        self.preload_route(route).await
    }

    /// Batches a route preload would run, in order.
    pub fn plan_route(&self, route: &str) -> Vec<Vec<String>> {
        let relevant = self.graph.relevant_namespaces(route);
        let ordered = self.graph.order_by_load(&relevant, self.is_authenticated());
        ordered
            .chunks(self.config.batch_size.max(1))
            .map(<[String]>::to_vec)
            .collect()
    }

    /// Load a route's namespaces batch by batch. Best-effort.
    pub async fn preload_route(&self, route: &str) -> RoutePreloadReport {
        let batches = self.plan_route(route);
        let mut report = RoutePreloadReport {
            route: route.to_string(),
            ..Default::default()
        };

        for (i, batch) in batches.iter().enumerate() {
            if i > 0 && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
            let results = join_all(batch.iter().map(|ns| self.load_best_effort(ns))).await;
            for (namespace, ok) in batch.iter().zip(results) {
                if ok {
                    report.loaded.push(namespace.clone());
                } else {
                    report.failed.push(namespace.clone());
                }
            }
        }

        debug!(
            route = %route,
            batches = batches.len(),
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "Route preload finished"
        );
        report.batches = batches;
        report
    }

    /// Preload several routes one after another.
    pub async fn preload_routes(&self, routes: &[&str]) -> Vec<RoutePreloadReport> {
        let mut reports = Vec::with_capacity(routes.len());
        for route in routes {
            reports.push(self.preload_route(route).await);
        }
        reports
    }

    /// Register an element whose first intersection prefetches `route`.
    pub fn observe(&self, element_id: &str, route: &str) {
        self.viewport.lock().observe(element_id, route);
    }

    pub fn unobserve(&self, element_id: &str) -> bool {
        self.viewport.lock().unobserve(element_id)
    }

    /// Intersection callback. Only the first intersection of an element
    /// triggers a preload.
    pub async fn on_intersect(&self, element_id: &str) -> Option<RoutePreloadReport> {
        let route = self.viewport.lock().trigger(element_id)?;
        debug!(element = %element_id, route = %route, "Viewport target visible");
        Some(self.preload_route(&route).await)
    }

    /// Record an interaction and schedule a debounced prediction.
    ///
    /// Each call supersedes the previous one: only the task spawned by the
    /// last interaction in a quiet period runs the prediction; earlier tasks
    /// resolve to `None`.
    pub fn on_interaction(self: &Arc<Self>, interaction: Interaction) -> JoinHandle<Option<PredictionOutcome>> {
        if let Interaction::Navigate { route } = &interaction {
            self.coordinator.set_route(route);
        }
        self.prediction.lock().record(interaction);
        let epoch = self.interaction_epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(this.config.debounce).await;
            if this.interaction_epoch.load(Ordering::SeqCst) != epoch {
                return None;
            }
            Some(this.predict_and_preload().await)
        })
    }

    /// Analyze recent behavior and, above threshold, load predicted
    /// non-critical namespaces at idle priority.
    pub async fn predict_and_preload(&self) -> PredictionOutcome {
        let snapshot = self.prediction.lock().analyze();
        let threshold = self.config.confidence_threshold;
        let acted = snapshot.should_prefetch(threshold);

        self.state.write().last_prediction = Some(snapshot.clone());
        self.telemetry.increment_counter("predictions.total", 1);
        self.telemetry
            .record_histogram("prediction.confidence", f64::from(snapshot.confidence));
        telemetry::metrics::record_prediction(snapshot.confidence, acted);

        if !acted {
            debug!(
                confidence = snapshot.confidence,
                threshold,
                candidates = snapshot.routes.len(),
                "Prediction below threshold"
            );
            return PredictionOutcome {
                snapshot,
                acted,
                scheduled: Vec::new(),
                loaded: Vec::new(),
            };
        }
        self.telemetry.increment_counter("predictions.acted", 1);

        let scheduled = self.predicted_namespaces(&snapshot.routes);
        info!(
            confidence = snapshot.confidence,
            routes = ?snapshot.routes,
            namespaces = ?scheduled,
            "Prefetching predicted namespaces"
        );

        let mut loaded = Vec::new();
        for (i, namespace) in scheduled.iter().enumerate() {
            if i > 0 && !self.config.idle_stagger.is_zero() {
                tokio::time::sleep(self.config.idle_stagger).await;
            }
            if self.load_best_effort(namespace).await {
                loaded.push(namespace.clone());
            }
        }

        PredictionOutcome {
            snapshot,
            acted,
            scheduled,
            loaded,
        }
    }

    /// Load the given namespaces concurrently; unlike route preloads, the
    /// first failure is returned.
    pub async fn force_preload(&self, namespaces: &[String]) -> Result<Vec<String>, PreloadError> {
        if let Some(unknown) = namespaces.iter().find(|ns| !self.graph.contains(ns)) {
            return Err(PreloadError::UnknownNamespace(unknown.clone()));
        }

        let locale = &self.config.locale;
        let results = join_all(
            namespaces
                .iter()
                .map(|ns| self.coordinator.ensure_loaded(ns, locale)),
        )
        .await;

        for (namespace, result) in namespaces.iter().zip(results) {
            if let Err(source) = result {
                return Err(PreloadError::LoadFailed {
                    namespace: namespace.clone(),
                    source,
                });
            }
        }
        Ok(namespaces.to_vec())
    }

    /// Periodic housekeeping: cache sweep, usage prune and event cleanup.
    pub fn tick(&self) -> TickReport {
        self.tick_at(Utc::now())
    }

    pub fn tick_at(&self, now: DateTime<Utc>) -> TickReport {
        let report = TickReport {
            expired: self.coordinator.sweep_at(now),
            pruned_usage: self.coordinator.usage().prune_at(now),
            pruned_events: self.prediction.lock().cleanup_at(now),
        };
        debug!(
            expired = report.expired.len(),
            pruned_usage = report.pruned_usage,
            pruned_events = report.pruned_events,
            "Tick"
        );
        report
    }

    pub fn snapshot(&self) -> PreloadSnapshot {
        let state = self.state.read();
        PreloadSnapshot {
            ready: state.ready,
            authenticated: self.is_authenticated(),
            locale: self.config.locale.clone(),
            current_route: self.coordinator.current_route(),
            loaded_namespaces: self.loaded_namespaces(),
            last_prediction: state.last_prediction.clone(),
            startup_ms: state.startup_ms,
            analytics: self.prediction.lock().analytics(),
        }
    }

    pub fn stats(&self) -> PreloadStats {
        PreloadStats {
            total_namespaces: self.graph.len(),
            loaded_namespaces: self.loaded_namespaces().len(),
            loader: self.coordinator.stats(),
            predictions: self.telemetry.counter("predictions.total"),
            predictions_acted: self.telemetry.counter("predictions.acted"),
        }
    }

    pub fn analytics(&self) -> PredictionAnalytics {
        self.prediction.lock().analytics()
    }

    pub fn analysis(&self) -> NamespaceAnalysis {
        analyze_usage(&self.graph, self.coordinator.usage(), self.is_authenticated())
    }

    pub fn graph(&self) -> &Arc<NamespaceGraph> {
        &self.graph
    }

    pub fn coordinator(&self) -> &LoadCoordinator {
        &self.coordinator
    }

    pub fn config(&self) -> &PreloadConfig {
        &self.config
    }

    fn loaded_namespaces(&self) -> Vec<String> {
        self.graph
            .names()
            .into_iter()
            .filter(|ns| self.coordinator.is_loaded(ns, &self.config.locale))
            .collect()
    }

    /// Namespaces behind the predicted routes, minus the critical path, in
    /// load order.
    fn predicted_namespaces(&self, routes: &[String]) -> Vec<String> {
        let authenticated = self.is_authenticated();
        let wanted: BTreeSet<String> = routes
            .iter()
            .flat_map(|route| self.graph.relevant_namespaces(route))
            .filter(|ns| !self.graph.is_critical(ns, authenticated))
            .collect();
        let wanted: Vec<String> = wanted.into_iter().collect();
        self.graph.order_by_load(&wanted, authenticated)
    }

    async fn load_best_effort(&self, namespace: &str) -> bool {
        match self.coordinator.ensure_loaded(namespace, &self.config.locale).await {
            Ok(_) => true,
            Err(e) => {
                warn!(namespace = %namespace, locale = %self.config.locale, error = %e, "Preload failed");
                false
            }
        }
    }
}
