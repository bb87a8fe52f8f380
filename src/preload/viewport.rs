//! Viewport-triggered prefetch registrations.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportTarget {
    pub route: String,
    pub triggered: bool,
}

/// Elements being watched for their first intersection.
#[derive(Debug, Default)]
pub struct ViewportRegistry {
    targets: HashMap<String, ViewportTarget>,
}

impl ViewportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `element_id`; its first intersection prefetches `route`.
    ///
    /// Re-registering with the same route keeps the triggered flag; a new
    /// route re-arms the element.
    pub fn observe(&mut self, element_id: &str, route: &str) {
        match self.targets.get_mut(element_id) {
            Some(target) if target.route == route => {}
            Some(target) => {
                target.route = route.to_string();
                target.triggered = false;
            }
            None => {
                self.targets.insert(
                    element_id.to_string(),
                    ViewportTarget {
                        route: route.to_string(),
                        triggered: false,
                    },
                );
            }
        }
    }

    pub fn unobserve(&mut self, element_id: &str) -> bool {
        self.targets.remove(element_id).is_some()
    }

    /// Mark an intersection. Returns the target route the first time only.
    pub fn trigger(&mut self, element_id: &str) -> Option<String> {
        let target = self.targets.get_mut(element_id)?;
        if target.triggered {
            return None;
        }
        target.triggered = true;
        Some(target.route.clone())
    }

    pub fn get(&self, element_id: &str) -> Option<&ViewportTarget> {
        self.targets.get(element_id)
    }

    /// Registered elements that have not intersected yet.
    pub fn armed(&self) -> usize {
        self.targets.values().filter(|t| !t.triggered).count()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_fires_once() {
        let mut r = ViewportRegistry::new();
        r.observe("card-1", "/lottery");
        assert_eq!(r.trigger("card-1"), Some("/lottery".to_string()));
        assert_eq!(r.trigger("card-1"), None);
        assert_eq!(r.trigger("unknown"), None);
    }

    #[test]
    fn test_reobserve_rearms_only_on_new_route() {
        let mut r = ViewportRegistry::new();
        r.observe("card", "/a");
        r.trigger("card");
        r.observe("card", "/a");
        assert_eq!(r.armed(), 0);
        r.observe("card", "/b");
        assert_eq!(r.armed(), 1);
        assert_eq!(r.trigger("card"), Some("/b".to_string()));
    }

    #[test]
    fn test_unobserve() {
        let mut r = ViewportRegistry::new();
        r.observe("x", "/x");
        assert!(r.unobserve("x"));
        assert!(!r.unobserve("x"));
        assert!(r.is_empty());
    }
}
