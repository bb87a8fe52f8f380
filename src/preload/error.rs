//! Preload orchestration errors.

use thiserror::Error;

use crate::loader::LoadError;

#[derive(Debug, Error)]
pub enum PreloadError {
    #[error("Critical namespace '{namespace}' failed to load: {source}")]
    CriticalLoadFailed {
        namespace: String,
        #[source]
        source: LoadError,
    },

    #[error("Namespace '{0}' is not in the catalog")]
    UnknownNamespace(String),

    #[error("Preload of '{namespace}' failed: {source}")]
    LoadFailed {
        namespace: String,
        #[source]
        source: LoadError,
    },
}

impl PreloadError {
    /// Startup cannot complete after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PreloadError::CriticalLoadFailed { .. })
    }
}
