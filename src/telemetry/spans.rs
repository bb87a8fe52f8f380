//! Span utilities for namespace loads.

use tracing::{info_span, Span};

/// Extension trait for recording outcomes on spans.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for namespace load spans.
pub struct LoadSpan;

impl LoadSpan {
    /// Create a `namespace_load` span.
    ///
    /// `status`, `error.message` and `latency_ms` start empty and are filled
    /// in after the fetch completes.
    pub fn new(locale: &str, namespace: &str) -> Span {
        info_span!(
            "namespace_load",
            locale = %locale,
            namespace = %namespace,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    }
}
