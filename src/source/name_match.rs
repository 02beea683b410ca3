//! Method-name pattern matching.

use tracing::debug;

use super::{ModelSource, is_match};
use crate::invocation::MethodDescriptor;

/// Maps method-*name* patterns to models, resolved lazily per lookup.
///
/// Patterns are matched against the bare method name (not the qualified
/// `Type.method` form). Resolution precedence:
///
/// 1. an exact-name mapping wins outright;
/// 2. otherwise, among matching wildcard patterns the *longest* pattern
///    string wins;
/// 3. length ties keep the first-registered pattern.
///
/// ```rust
/// use muninn::{CachingModel, MethodDescriptor, ModelSource, NameMatchModelSource};
///
/// let source = NameMatchModelSource::new()
///     .mapping("get*", CachingModel::new("generic"))
///     .mapping("*customer", CachingModel::new("customers"));
///
/// let method = MethodDescriptor::new("CustomerService", "get_customer", ["u64"]);
/// // "*customer" is the longer matching pattern
/// assert_eq!(source.model(&method).unwrap().cache_name(), "customers");
/// ```
#[derive(Debug, Default)]
pub struct NameMatchModelSource<M> {
    // registration order matters for the equal-length tie-break
    mappings: Vec<(String, M)>,
}

impl<M: Clone + Send + Sync> NameMatchModelSource<M> {
    /// Create an empty source.
    pub fn new() -> Self {
        Self {
            mappings: Vec::new(),
        }
    }

    /// Bind a model to a method-name pattern. Patterns may carry a single
    /// leading or trailing `*`.
    pub fn mapping(mut self, pattern: impl Into<String>, model: M) -> Self {
        let pattern = pattern.into();
        debug!(pattern = %pattern, "registering name-match binding");
        self.mappings.push((pattern, model));
        self
    }

    /// Number of registered mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether no mappings are registered.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    fn best_match(&self, method_name: &str) -> Option<&M> {
        // exact match short-circuits any wildcard
        if let Some((_, model)) = self.mappings.iter().find(|(p, _)| p == method_name) {
            return Some(model);
        }

        let mut best: Option<(&str, &M)> = None;
        for (pattern, model) in &self.mappings {
            if !is_match(method_name, pattern) {
                continue;
            }
            // strictly longer replaces; equal length keeps the earlier one
            match best {
                Some((best_pattern, _)) if pattern.len() <= best_pattern.len() => {}
                _ => best = Some((pattern, model)),
            }
        }
        best.map(|(_, model)| model)
    }
}

impl<M: Clone + Send + Sync> ModelSource<M> for NameMatchModelSource<M> {
    fn model(&self, method: &MethodDescriptor) -> Option<M> {
        self.best_match(method.method_name()).cloned()
    }

    fn configured_models(&self) -> Vec<M> {
        self.mappings.iter().map(|(_, m)| m.clone()).collect()
    }
}
