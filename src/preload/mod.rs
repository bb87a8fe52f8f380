//! Preload scheduling: startup, navigation, viewport and prediction triggers.

mod error;
mod orchestrator;
mod viewport;

pub use error::PreloadError;
pub use orchestrator::{
    PredictionOutcome, PreloadConfig, PreloadOrchestrator, PreloadSnapshot, PreloadStats, RoutePreloadReport,
    StartupReport, TickReport,
};
pub use viewport::{ViewportRegistry, ViewportTarget};
