//! Namespace catalog: records, route patterns, the dependency graph, and
//! catalog file parsing.

mod error;
mod graph;
pub mod manifest;
mod namespace;

pub use error::CatalogError;
pub use graph::{GraphRoles, NamespaceGraph};
pub use manifest::{load_graph, Catalog, NamespaceEntry};
pub use namespace::{Namespace, Priority, RoutePattern};
