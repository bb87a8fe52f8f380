//! Telemetry: structured logging, load spans, metrics facade helpers and an
//! in-process telemetry store.

mod logging;
pub mod metrics;
mod spans;
mod store;

pub use logging::{init_logging, open_sink, validate_filter, LogConfig, LogError, LogFormat};
pub use spans::{LoadSpan, SpanExt};
pub use store::{HistogramSummary, TelemetrySnapshot, TelemetryStore};
