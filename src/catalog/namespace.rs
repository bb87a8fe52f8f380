//! Namespace records, priority tiers and route patterns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CatalogError;

/// Load priority tier of a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    /// Ordering weight; higher loads earlier within a dependency tier.
    pub fn weight(self) -> u32 {
        match self {
            Priority::Critical => 100,
            Priority::High => 75,
            Priority::Normal => 50,
            Priority::Low => 25,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PatternKind {
    Exact(String),
    Prefix(String),
}

/// Route pattern. A trailing `*` matches any suffix; otherwise the route must
/// match exactly.
///
/// Patterns start with `/` and may contain `*` only as the final character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoutePattern {
    raw: String,
    kind: PatternKind,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if !raw.starts_with('/') {
            return Err(invalid("pattern must start with '/'"));
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(invalid("pattern contains whitespace"));
        }

        let kind = match raw.find('*') {
            None => PatternKind::Exact(raw.to_string()),
            Some(idx) if idx == raw.len() - 1 => PatternKind::Prefix(raw[..idx].to_string()),
            Some(_) => return Err(invalid("'*' is only allowed as the final character")),
        };

        Ok(Self {
            raw: raw.to_string(),
            kind,
        })
    }

    pub fn matches(&self, route: &str) -> bool {
        match &self.kind {
            PatternKind::Exact(path) => route == path,
            PatternKind::Prefix(prefix) => route.starts_with(prefix.as_str()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for RoutePattern {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoutePattern {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoutePattern> for String {
    fn from(pattern: RoutePattern) -> Self {
        pattern.raw
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One catalog entry. Immutable once the graph is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub route_patterns: Vec<RoutePattern>,
    #[serde(default)]
    pub estimated_size_bytes: u64,
}

impl Namespace {
    pub fn new(name: &str, priority: Priority) -> Self {
        Self {
            name: name.to_string(),
            priority,
            dependencies: Vec::new(),
            route_patterns: Vec::new(),
            estimated_size_bytes: 0,
        }
    }

    pub fn depends_on(mut self, deps: &[&str]) -> Self {
        self.dependencies = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Attach route patterns, rejecting any that fail to parse.
    pub fn with_routes(mut self, patterns: &[&str]) -> Result<Self, CatalogError> {
        self.route_patterns = patterns
            .iter()
            .map(|p| RoutePattern::parse(p))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    pub fn with_size(mut self, bytes: u64) -> Self {
        self.estimated_size_bytes = bytes;
        self
    }

    pub fn matches_route(&self, route: &str) -> bool {
        self.route_patterns.iter().any(|p| p.matches(route))
    }
}
