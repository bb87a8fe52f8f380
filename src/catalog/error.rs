//! Catalog construction errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Dependency cycle detected among namespaces: {}", .0.join(", "))]
    CycleDetected(Vec<String>),

    #[error("Namespace '{namespace}' depends on unknown namespace '{dependency}'")]
    UnknownDependency { namespace: String, dependency: String },

    #[error("Duplicate namespace: {0}")]
    DuplicateNamespace(String),

    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Base namespace '{0}' is not declared in the catalog")]
    MissingBase(String),

    #[error("Catalog parse error: {0}")]
    Parse(String),

    #[error("Failed to read catalog: {0}")]
    Io(String),
}
