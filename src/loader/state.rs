//! Per-key load state and load errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::FetchError;

/// Lifecycle of one cache key.
///
/// `Idle → Loading → Success | Error`; a reload moves `Success`/`Error` back
/// to `Loading`. An `Error` key never blocks the next attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::Loading => "loading",
            LoadState::Success => "success",
            LoadState::Error(_) => "error",
        }
    }
}

/// Failure of a coordinated load. Cloneable so every joined caller gets it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The load task panicked or was aborted by runtime shutdown.
    #[error("Load task for {key} did not complete: {reason}")]
    Task { key: String, reason: String },
}

impl LoadError {
    pub fn is_retryable(&self) -> bool {
        match self {
            LoadError::Fetch(e) => e.is_retryable(),
            LoadError::Task { .. } => true,
        }
    }
}
