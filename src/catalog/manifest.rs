//! Catalog documents in TOML or JSON.
//!
//! ```toml
//! base_namespace = "common"
//! auth_namespace = "auth"
//!
//! [[namespaces]]
//! name = "common"
//! priority = "critical"
//! estimated_size_bytes = 12000
//!
//! [[namespaces]]
//! name = "admin"
//! dependencies = ["common", "auth"]
//! route_patterns = ["/admin*"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::CatalogError;
use super::graph::{GraphRoles, NamespaceGraph};
use super::namespace::{Namespace, Priority, RoutePattern};

fn default_base() -> String {
    "common".to_string()
}

fn default_auth() -> Option<String> {
    Some("auth".to_string())
}

/// Raw namespace record as written in a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceEntry {
    pub name: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub route_patterns: Vec<String>,
    #[serde(default)]
    pub estimated_size_bytes: u64,
}

impl NamespaceEntry {
    fn into_namespace(self) -> Result<Namespace, CatalogError> {
        let route_patterns = self
            .route_patterns
            .iter()
            .map(|p| RoutePattern::parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Namespace {
            name: self.name,
            priority: self.priority,
            dependencies: self.dependencies,
            route_patterns,
            estimated_size_bytes: self.estimated_size_bytes,
        })
    }
}

/// Ordered namespace catalog plus role assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default = "default_base")]
    pub base_namespace: String,
    #[serde(default = "default_auth")]
    pub auth_namespace: Option<String>,
    #[serde(default)]
    pub namespaces: Vec<NamespaceEntry>,
}

impl Catalog {
    /// Load from a file; `.json` is parsed as JSON, anything else as TOML.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        toml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// Validate patterns and dependencies and build the graph.
    pub fn into_graph(self) -> Result<NamespaceGraph, CatalogError> {
        let roles = GraphRoles {
            base: self.base_namespace,
            auth: self.auth_namespace,
        };
        let namespaces = self
            .namespaces
            .into_iter()
            .map(NamespaceEntry::into_namespace)
            .collect::<Result<Vec<_>, _>>()?;
        NamespaceGraph::new(namespaces, roles)
    }
}

/// Parse and validate a catalog file in one step.
pub fn load_graph(path: &Path) -> Result<NamespaceGraph, CatalogError> {
    Catalog::from_file(path)?.into_graph()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[namespaces]]
name = "common"
priority = "critical"
estimated_size_bytes = 100

[[namespaces]]
name = "auth"
priority = "high"
dependencies = ["common"]

[[namespaces]]
name = "admin"
dependencies = ["common", "auth"]
route_patterns = ["/admin*"]
"#;

    #[test]
    fn test_toml_defaults() {
        let catalog = Catalog::from_toml(SAMPLE).unwrap();
        assert_eq!(catalog.base_namespace, "common");
        assert_eq!(catalog.auth_namespace.as_deref(), Some("auth"));
        assert_eq!(catalog.namespaces.len(), 3);
        assert_eq!(catalog.namespaces[2].priority, Priority::Normal);
    }

    #[test]
    fn test_into_graph() {
        let graph = Catalog::from_toml(SAMPLE).unwrap().into_graph().unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.total_estimated_size(), 100);
        assert_eq!(graph.relevant_namespaces("/admin/users"), vec!["common", "auth", "admin"]);
    }

    #[test]
    fn test_invalid_pattern_reported_as_pattern_error() {
        let json = r#"{"namespaces":[{"name":"common","route_patterns":["no-slash"]}]}"#;
        let err = Catalog::from_json(json).unwrap().into_graph().unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPattern { .. }));
    }

    #[test]
    fn test_unknown_priority_is_parse_error() {
        let toml = "[[namespaces]]\nname = \"common\"\npriority = \"urgent\"\n";
        assert!(matches!(Catalog::from_toml(toml), Err(CatalogError::Parse(_))));
    }
}
