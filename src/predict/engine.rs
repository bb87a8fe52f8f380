//! Behavior-driven route prediction.
//!
//! Keeps bounded rolling histories of clicks, hovers and route visits plus the
//! latest scroll sample, and turns them into a ranked list of likely next
//! routes with a 0-100 confidence score.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::events::{ClickEvent, HoverEvent, Interaction, RouteVisit, ScrollDirection, ScrollSample};

/// Prediction tuning. All thresholds are plain configuration.
#[derive(Debug, Clone)]
pub struct PredictionConfig {
    pub max_clicks: usize,
    pub max_hovers: usize,
    pub max_routes: usize,
    /// Events older than this are dropped by `cleanup`.
    pub retention: Duration,
    /// How many trailing route visits sequence matching looks at.
    pub sequence_window: usize,
    /// An element must be hovered more than this many times to count.
    pub hover_min_count: usize,
    pub hover_top_n: usize,
    /// Downward scroll faster than this (px/ms) suggests pagination.
    pub fast_scroll_speed: f64,
    pub pagination_routes: Vec<String>,
    /// Element tag → routes it leads to.
    pub element_routes: HashMap<String, Vec<String>>,
    /// Known multi-step navigation sequences.
    pub sequences: Vec<Vec<String>>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PredictionConfig {
    fn default() -> Self {
        let element_routes = [
            ("nav-item-home", vec!["/"]),
            ("nav-item-orders", vec!["/orders"]),
            ("nav-item-profile", vec!["/profile"]),
            ("nav-item-wallet", vec!["/wallet", "/transactions"]),
            ("nav-item-referral", vec!["/referral"]),
            ("menu-item-lottery", vec!["/lottery"]),
            ("menu-item-settings", vec!["/settings"]),
        ]
        .into_iter()
        .map(|(element, routes)| (element.to_string(), strings(&routes)))
        .collect();

        Self {
            max_clicks: 50,
            max_hovers: 30,
            max_routes: 20,
            retention: Duration::hours(1),
            sequence_window: 5,
            hover_min_count: 2,
            hover_top_n: 5,
            fast_scroll_speed: 0.5,
            pagination_routes: strings(&["/load-more", "/next-page"]),
            element_routes,
            sequences: vec![
                strings(&["/orders", "/profile", "/settings"]),
                strings(&["/lottery", "/wallet", "/transactions"]),
            ],
        }
    }
}

/// Result of one `analyze` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSnapshot {
    /// Candidate routes, most likely first, without duplicates.
    pub routes: Vec<String>,
    /// 0-100.
    pub confidence: u8,
    pub reasons: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl PredictionSnapshot {
    /// True when confidence is strictly above `threshold` and there is at
    /// least one candidate.
    pub fn should_prefetch(&self, threshold: u8) -> bool {
        self.confidence > threshold && !self.routes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionAnalytics {
    pub click_count: usize,
    pub hover_count: usize,
    pub route_count: usize,
    /// Confidence from history alone, before counting candidates.
    pub baseline_confidence: u8,
    pub top_predictions: Vec<String>,
}

pub struct PredictionEngine {
    config: PredictionConfig,
    clicks: VecDeque<ClickEvent>,
    hovers: VecDeque<HoverEvent>,
    routes: VecDeque<RouteVisit>,
    scroll: Option<ScrollSample>,
}

impl PredictionEngine {
    pub fn new(config: PredictionConfig) -> Self {
        Self {
            config,
            clicks: VecDeque::new(),
            hovers: VecDeque::new(),
            routes: VecDeque::new(),
            scroll: None,
        }
    }

    pub fn record(&mut self, interaction: Interaction) {
        self.record_at(interaction, Utc::now());
    }

    pub fn record_at(&mut self, interaction: Interaction, now: DateTime<Utc>) {
        match interaction {
            Interaction::Click { x, y, element } => self.record_click_at(x, y, &element, now),
            Interaction::Hover { element, duration_ms } => self.record_hover_at(&element, duration_ms, now),
            Interaction::Scroll { position } => self.record_scroll_at(position, now),
            Interaction::Navigate { route } => self.record_route_at(&route, now),
        }
    }

    pub fn record_click_at(&mut self, x: f64, y: f64, element: &str, now: DateTime<Utc>) {
        self.clicks.push_back(ClickEvent {
            x,
            y,
            element: element.to_string(),
            at: now,
        });
        while self.clicks.len() > self.config.max_clicks {
            self.clicks.pop_front();
        }
    }

    pub fn record_hover_at(&mut self, element: &str, duration_ms: u64, now: DateTime<Utc>) {
        self.hovers.push_back(HoverEvent {
            element: element.to_string(),
            duration_ms,
            at: now,
        });
        while self.hovers.len() > self.config.max_hovers {
            self.hovers.pop_front();
        }
    }

    pub fn record_route_at(&mut self, route: &str, now: DateTime<Utc>) {
        self.routes.push_back(RouteVisit {
            route: route.to_string(),
            at: now,
        });
        while self.routes.len() > self.config.max_routes {
            self.routes.pop_front();
        }
    }

    /// Update the scroll sample from a new position.
    ///
    /// Direction and speed are derived from the previous sample; a sample at
    /// the same instant as the previous one is ignored.
    pub fn record_scroll_at(&mut self, position: f64, now: DateTime<Utc>) {
        let sample = match self.scroll {
            None => ScrollSample {
                position,
                direction: ScrollDirection::Down,
                speed: 0.0,
                at: now,
            },
            Some(prev) => {
                let elapsed_ms = (now - prev.at).num_milliseconds();
                if elapsed_ms <= 0 {
                    return;
                }
                ScrollSample {
                    position,
                    direction: if position > prev.position {
                        ScrollDirection::Down
                    } else {
                        ScrollDirection::Up
                    },
                    speed: (position - prev.position).abs() / elapsed_ms as f64,
                    at: now,
                }
            }
        };
        self.scroll = Some(sample);
    }

    pub fn analyze(&self) -> PredictionSnapshot {
        self.analyze_at(Utc::now())
    }

    pub fn analyze_at(&self, now: DateTime<Utc>) -> PredictionSnapshot {
        let mut routes = Vec::new();
        for candidate in self
            .sequence_predictions()
            .into_iter()
            .chain(self.scroll_predictions())
            .chain(self.hover_predictions())
        {
            if !routes.contains(&candidate) {
                routes.push(candidate);
            }
        }

        PredictionSnapshot {
            confidence: self.confidence(routes.len()),
            reasons: self.reasons(routes.len()),
            routes,
            timestamp: now,
        }
    }

    /// `round(100 * (min(routes/10,1)*0.4 + min(clicks/20,1)*0.3 + min(candidates/5,1)*0.3))`
    pub fn confidence(&self, candidates: usize) -> u8 {
        let history = (self.routes.len() as f64 / 10.0).min(1.0) * 0.4;
        let behavior = (self.clicks.len() as f64 / 20.0).min(1.0) * 0.3;
        let breadth = (candidates as f64 / 5.0).min(1.0) * 0.3;
        ((history + behavior + breadth) * 100.0).round() as u8
    }

    /// Drop events older than the retention window. Returns how many.
    pub fn cleanup(&mut self) -> usize {
        self.cleanup_at(Utc::now())
    }

    pub fn cleanup_at(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.config.retention;
        let before = self.clicks.len() + self.hovers.len() + self.routes.len();
        self.clicks.retain(|c| c.at >= cutoff);
        self.hovers.retain(|h| h.at >= cutoff);
        self.routes.retain(|r| r.at >= cutoff);
        if self.scroll.is_some_and(|s| s.at < cutoff) {
            self.scroll = None;
        }
        before - (self.clicks.len() + self.hovers.len() + self.routes.len())
    }

    pub fn analytics(&self) -> PredictionAnalytics {
        PredictionAnalytics {
            click_count: self.clicks.len(),
            hover_count: self.hovers.len(),
            route_count: self.routes.len(),
            baseline_confidence: self.confidence(0),
            top_predictions: self.sequence_predictions(),
        }
    }

    pub fn last_route(&self) -> Option<&str> {
        self.routes.back().map(|r| r.route.as_str())
    }

    pub fn scroll(&self) -> Option<ScrollSample> {
        self.scroll
    }

    pub fn reset(&mut self) {
        self.clicks.clear();
        self.hovers.clear();
        self.routes.clear();
        self.scroll = None;
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// Next step of every known sequence whose two preceding steps are the
    /// last two routes visited.
    fn sequence_predictions(&self) -> Vec<String> {
        let window = self.config.sequence_window.max(2);
        let recent: Vec<&str> = self
            .routes
            .iter()
            .rev()
            .take(window)
            .map(|r| r.route.as_str())
            .collect();
        if recent.len() < 2 {
            return Vec::new();
        }
        let (last, previous) = (recent[0], recent[1]);

        let mut predictions = Vec::new();
        for sequence in &self.config.sequences {
            for step in sequence.windows(3) {
                if step[0] == previous && step[1] == last && !predictions.contains(&step[2]) {
                    predictions.push(step[2].clone());
                }
            }
        }
        predictions
    }

    fn scroll_predictions(&self) -> Vec<String> {
        match self.scroll {
            Some(s) if s.direction == ScrollDirection::Down && s.speed > self.config.fast_scroll_speed => {
                self.config.pagination_routes.clone()
            }
            _ => Vec::new(),
        }
    }

    /// Routes behind the most-hovered elements.
    fn hover_predictions(&self) -> Vec<String> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for hover in &self.hovers {
            match counts.iter_mut().find(|(e, _)| *e == hover.element) {
                Some((_, n)) => *n += 1,
                None => counts.push((hover.element.as_str(), 1)),
            }
        }
        counts.retain(|(_, n)| *n > self.config.hover_min_count);
        // Stable: ties keep first-hovered order.
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        counts
            .into_iter()
            .take(self.config.hover_top_n)
            .filter_map(|(element, _)| self.config.element_routes.get(element))
            .flatten()
            .cloned()
            .collect()
    }

    fn reasons(&self, candidates: usize) -> Vec<String> {
        let mut reasons = Vec::new();
        if !self.routes.is_empty() {
            reasons.push("route history".to_string());
        }
        if self.clicks.len() > 5 {
            reasons.push("click behavior".to_string());
        }
        if self.hovers.len() > 3 {
            reasons.push("hover pattern".to_string());
        }
        if candidates > 0 {
            reasons.push("predicted candidates".to_string());
        }
        reasons
    }
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new(PredictionConfig::default())
    }
}
