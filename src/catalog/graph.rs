//! Namespace dependency graph and load ordering.
//!
//! The graph is validated once at construction (no duplicates, no unknown
//! dependencies, no cycles) and is read-only afterwards, so every ordering
//! query is a pure function of the catalog and the auth signal.

use std::cmp::Reverse;
use std::collections::HashMap;

use super::error::CatalogError;
use super::namespace::{Namespace, Priority};

/// Which namespaces play the base and auth-scoped roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRoles {
    /// Always loaded first and always relevant.
    pub base: String,
    /// Loaded on the critical path only when the auth signal is present.
    pub auth: Option<String>,
}

impl Default for GraphRoles {
    fn default() -> Self {
        Self {
            base: "common".to_string(),
            auth: Some("auth".to_string()),
        }
    }
}

/// Validated, immutable namespace catalog.
#[derive(Debug, Clone)]
pub struct NamespaceGraph {
    namespaces: Vec<Namespace>,
    index: HashMap<String, usize>,
    /// Resolved dependency indices per namespace.
    dependencies: Vec<Vec<usize>>,
    /// Kahn tiers, each sorted by descending priority weight.
    tiers: Vec<Vec<usize>>,
    base: usize,
    auth: Option<usize>,
}

impl NamespaceGraph {
    /// Build and validate a graph.
    pub fn new(namespaces: Vec<Namespace>, roles: GraphRoles) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(namespaces.len());
        for (i, ns) in namespaces.iter().enumerate() {
            if index.insert(ns.name.clone(), i).is_some() {
                return Err(CatalogError::DuplicateNamespace(ns.name.clone()));
            }
        }

        let mut dependencies = Vec::with_capacity(namespaces.len());
        for ns in &namespaces {
            let mut resolved = Vec::with_capacity(ns.dependencies.len());
            for dep in &ns.dependencies {
                let idx = index.get(dep).copied().ok_or_else(|| CatalogError::UnknownDependency {
                    namespace: ns.name.clone(),
                    dependency: dep.clone(),
                })?;
                if !resolved.contains(&idx) {
                    resolved.push(idx);
                }
            }
            dependencies.push(resolved);
        }

        let base = index
            .get(&roles.base)
            .copied()
            .ok_or_else(|| CatalogError::MissingBase(roles.base.clone()))?;

        let auth = match roles.auth {
            Some(name) => {
                let idx = index.get(&name).copied();
                if idx.is_none() {
                    tracing::warn!(namespace = %name, "Auth namespace not in catalog; auth signal ignored");
                }
                idx.filter(|&i| i != base)
            }
            None => None,
        };

        let tiers = kahn_tiers(&namespaces, &dependencies)?;

        Ok(Self {
            namespaces,
            index,
            dependencies,
            tiers,
            base,
            auth,
        })
    }

    /// Namespaces that must be loaded before the application is ready.
    ///
    /// Base first, then the auth-scoped namespace iff `authenticated`, then
    /// every other critical namespace in catalog order.
    pub fn critical_path(&self, authenticated: bool) -> Vec<String> {
        self.critical_indices(authenticated)
            .into_iter()
            .map(|i| self.namespaces[i].name.clone())
            .collect()
    }

    /// Global load order.
    ///
    /// Kahn tiers with each tier sorted by descending priority weight, with
    /// critical-path entries (and any of their not-yet-placed dependencies)
    /// moved to the front. Every dependency precedes its dependents.
    pub fn optimized_load_order(&self, authenticated: bool) -> Vec<String> {
        self.load_order_indices(authenticated)
            .into_iter()
            .map(|i| self.namespaces[i].name.clone())
            .collect()
    }

    /// Namespaces needed to render `route`: every namespace whose pattern
    /// matches, their transitive dependencies, and the base namespace.
    ///
    /// Returned in catalog order.
    pub fn relevant_namespaces(&self, route: &str) -> Vec<String> {
        let mut marked = vec![false; self.namespaces.len()];
        self.mark_with_dependencies(self.base, &mut marked);
        for (i, ns) in self.namespaces.iter().enumerate() {
            if ns.matches_route(route) {
                self.mark_with_dependencies(i, &mut marked);
            }
        }
        self.collect_marked(&marked)
    }

    /// Sort `names` by their position in the optimized load order.
    /// Names not in the catalog keep their relative order at the end.
    pub fn order_by_load(&self, names: &[String], authenticated: bool) -> Vec<String> {
        let order = self.load_order_indices(authenticated);
        let mut position = vec![usize::MAX; self.namespaces.len()];
        for (pos, &i) in order.iter().enumerate() {
            position[i] = pos;
        }
        let mut sorted: Vec<String> = names.to_vec();
        sorted.sort_by_key(|name| {
            self.index
                .get(name)
                .map(|&i| position[i])
                .unwrap_or(usize::MAX)
        });
        sorted
    }

    /// All transitive dependencies of `name`, in catalog order.
    pub fn transitive_dependencies(&self, name: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        let mut marked = vec![false; self.namespaces.len()];
        self.mark_with_dependencies(idx, &mut marked);
        marked[idx] = false;
        self.collect_marked(&marked)
    }

    /// Dependency tiers as computed by Kahn's algorithm (weight-sorted).
    pub fn tiers(&self) -> Vec<Vec<String>> {
        self.tiers
            .iter()
            .map(|tier| tier.iter().map(|&i| self.namespaces[i].name.clone()).collect())
            .collect()
    }

    pub fn is_critical(&self, name: &str, authenticated: bool) -> bool {
        self.index
            .get(name)
            .map(|i| self.critical_indices(authenticated).contains(i))
            .unwrap_or(false)
    }

    /// Sum of declared estimated sizes.
    pub fn total_estimated_size(&self) -> u64 {
        self.namespaces.iter().map(|ns| ns.estimated_size_bytes).sum()
    }

    pub fn get(&self, name: &str) -> Option<&Namespace> {
        self.index.get(name).map(|&i| &self.namespaces[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn names(&self) -> Vec<String> {
        self.namespaces.iter().map(|ns| ns.name.clone()).collect()
    }

    pub fn base_namespace(&self) -> &str {
        &self.namespaces[self.base].name
    }

    pub fn auth_namespace(&self) -> Option<&str> {
        self.auth.map(|i| self.namespaces[i].name.as_str())
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    fn critical_indices(&self, authenticated: bool) -> Vec<usize> {
        let mut path = vec![self.base];
        if authenticated {
            if let Some(auth) = self.auth {
                path.push(auth);
            }
        }
        for (i, ns) in self.namespaces.iter().enumerate() {
            if ns.priority == Priority::Critical && i != self.base && Some(i) != self.auth {
                path.push(i);
            }
        }
        path
    }

    fn load_order_indices(&self, authenticated: bool) -> Vec<usize> {
        let kahn: Vec<usize> = self.tiers.concat();
        let mut position = vec![0usize; self.namespaces.len()];
        for (pos, &i) in kahn.iter().enumerate() {
            position[i] = pos;
        }

        let mut placed = vec![false; self.namespaces.len()];
        let mut order = Vec::with_capacity(self.namespaces.len());
        for c in self.critical_indices(authenticated) {
            self.place_with_dependencies(c, &position, &mut placed, &mut order);
        }
        for i in kahn {
            if !placed[i] {
                placed[i] = true;
                order.push(i);
            }
        }
        order
    }

    /// Append `idx` after its unplaced dependencies (in Kahn position order).
    fn place_with_dependencies(
        &self,
        idx: usize,
        position: &[usize],
        placed: &mut [bool],
        order: &mut Vec<usize>,
    ) {
        if placed[idx] {
            return;
        }
        let mut deps = self.dependencies[idx].clone();
        deps.sort_by_key(|&d| position[d]);
        for d in deps {
            self.place_with_dependencies(d, position, placed, order);
        }
        placed[idx] = true;
        order.push(idx);
    }

    fn mark_with_dependencies(&self, idx: usize, marked: &mut [bool]) {
        let mut stack = vec![idx];
        while let Some(i) = stack.pop() {
            if marked[i] {
                continue;
            }
            marked[i] = true;
            stack.extend(self.dependencies[i].iter().copied().filter(|&d| !marked[d]));
        }
    }

    fn collect_marked(&self, marked: &[bool]) -> Vec<String> {
        marked
            .iter()
            .enumerate()
            .filter(|(_, m)| **m)
            .map(|(i, _)| self.namespaces[i].name.clone())
            .collect()
    }
}

/// Kahn's algorithm over dependency→dependent edges, tier by tier.
///
/// Each tier is the zero-in-degree set at one step, ordered by catalog
/// position and then stably sorted by descending priority weight.
fn kahn_tiers(namespaces: &[Namespace], dependencies: &[Vec<usize>]) -> Result<Vec<Vec<usize>>, CatalogError> {
    let n = namespaces.len();
    let mut in_degree: Vec<usize> = dependencies.iter().map(Vec::len).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, deps) in dependencies.iter().enumerate() {
        for &d in deps {
            dependents[d].push(i);
        }
    }

    let mut tiers = Vec::new();
    let mut placed = 0;
    let mut current: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();

    while !current.is_empty() {
        current.sort_unstable();
        current.sort_by_key(|&i| Reverse(namespaces[i].priority.weight()));

        let mut next = Vec::new();
        for &i in &current {
            for &dependent in &dependents[i] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    next.push(dependent);
                }
            }
        }

        placed += current.len();
        tiers.push(current);
        current = next;
    }

    if placed < n {
        let cycle = (0..n)
            .filter(|&i| in_degree[i] > 0)
            .map(|i| namespaces[i].name.clone())
            .collect();
        return Err(CatalogError::CycleDetected(cycle));
    }

    Ok(tiers)
}
