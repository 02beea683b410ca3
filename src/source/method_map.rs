//! Eagerly-resolved method-map bindings.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::{ModelSource, is_match};
use crate::error::{CacheError, Result};
use crate::invocation::{MethodDescriptor, MethodRegistry};

/// Binds models to methods through fully-qualified name patterns, resolved
/// eagerly against a [`MethodRegistry`].
///
/// [`add_model`](Self::add_model) expands the pattern against every
/// registered method immediately; after configuration, lookups are plain
/// map reads. A pattern matching zero methods is a configuration error —
/// a misspelt binding must fail at startup, never silently at call time.
///
/// When patterns overlap, a method already bound under pattern `p` is
/// rebound by a later `add_model` with pattern `q` only when `q` differs
/// from `p` and `q` is no longer than `p`: a shorter-qualified (more
/// specific) pattern is allowed to tighten an earlier binding, while a
/// longer (less specific) one registered later leaves it untouched.
/// Re-registering the identical pattern keeps the first binding.
#[derive(Debug)]
pub struct MethodMapModelSource<M> {
    registry: Arc<MethodRegistry>,
    models: HashMap<MethodDescriptor, M>,
    // pattern each method is currently bound under, for the rebinding rule
    registered: HashMap<MethodDescriptor, String>,
}

impl<M: Clone + Send + Sync> MethodMapModelSource<M> {
    /// Create a source resolving patterns against the given registry.
    pub fn new(registry: Arc<MethodRegistry>) -> Self {
        Self {
            registry,
            models: HashMap::new(),
            registered: HashMap::new(),
        }
    }

    /// Bind `model` to every registered method whose qualified name matches
    /// `pattern` (`Type.method`, optionally with a single leading or
    /// trailing `*`).
    ///
    /// # Errors
    ///
    /// [`CacheError::NoMatchingMethod`] when the pattern matches no
    /// registered method.
    pub fn add_model(&mut self, model: M, pattern: &str) -> Result<()> {
        let matches: Vec<MethodDescriptor> = self
            .registry
            .methods()
            .iter()
            .filter(|m| is_match(&m.qualified_name(), pattern))
            .cloned()
            .collect();

        if matches.is_empty() {
            return Err(CacheError::NoMatchingMethod(pattern.to_string()));
        }

        for method in matches {
            if self.should_bind(&method, pattern) {
                debug!(method = %method, pattern = %pattern, "binding model to method");
                self.registered.insert(method.clone(), pattern.to_string());
                self.models.insert(method, model.clone());
            }
        }
        Ok(())
    }

    // A method is (re)bound when it has no binding yet, or when the new
    // pattern differs from the recorded one and is no longer than it.
    fn should_bind(&self, method: &MethodDescriptor, pattern: &str) -> bool {
        match self.registered.get(method) {
            None => true,
            Some(recorded) => pattern != recorded && pattern.len() <= recorded.len(),
        }
    }

    /// Number of methods currently bound.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no methods are bound.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl<M: Clone + Send + Sync> ModelSource<M> for MethodMapModelSource<M> {
    fn model(&self, method: &MethodDescriptor) -> Option<M> {
        self.models.get(method).cloned()
    }

    fn configured_models(&self) -> Vec<M> {
        self.models.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CachingModel;

    fn registry() -> Arc<MethodRegistry> {
        let mut registry = MethodRegistry::new();
        registry
            .register(MethodDescriptor::new("BookService", "find_by_isbn", ["&str"]))
            .register(MethodDescriptor::new("BookService", "find_all", Vec::<String>::new()))
            .register(MethodDescriptor::new("BookService", "remove_all", Vec::<String>::new()));
        Arc::new(registry)
    }

    fn find_by_isbn() -> MethodDescriptor {
        MethodDescriptor::new("BookService", "find_by_isbn", ["&str"])
    }

    fn find_all() -> MethodDescriptor {
        MethodDescriptor::new("BookService", "find_all", Vec::<String>::new())
    }

    fn model(region: &str) -> CachingModel {
        CachingModel::new(region)
    }

    #[test]
    fn wildcard_binds_every_matching_method() {
        let mut source = MethodMapModelSource::new(registry());
        source.add_model(model("books"), "BookService.find*").unwrap();

        assert_eq!(source.model(&find_by_isbn()).unwrap().cache_name(), "books");
        assert_eq!(source.model(&find_all()).unwrap().cache_name(), "books");
        assert!(
            source
                .model(&MethodDescriptor::new(
                    "BookService",
                    "remove_all",
                    Vec::<String>::new()
                ))
                .is_none()
        );
    }

    #[test]
    fn exact_pattern_binds_single_method() {
        let mut source = MethodMapModelSource::new(registry());
        source
            .add_model(model("books"), "BookService.find_by_isbn")
            .unwrap();
        assert_eq!(source.len(), 1);
        assert!(source.model(&find_all()).is_none());
    }

    #[test]
    fn leading_wildcard_matches_suffix() {
        let mut source = MethodMapModelSource::new(registry());
        source.add_model(model("alls"), "*_all").unwrap();
        assert!(source.model(&find_all()).is_some());
        assert!(source.model(&find_by_isbn()).is_none());
    }

    #[test]
    fn zero_matches_is_a_configuration_error() {
        let mut source = MethodMapModelSource::new(registry());
        let err = source
            .add_model(model("books"), "BookService.missing*")
            .unwrap_err();
        assert!(matches!(err, CacheError::NoMatchingMethod(_)));
        assert!(source.is_empty());
    }

    #[test]
    fn shorter_pattern_registered_later_rebinds() {
        let mut source = MethodMapModelSource::new(registry());
        source
            .add_model(model("first"), "BookService.find_by*")
            .unwrap();
        // "BookService.find*" is shorter than "BookService.find_by*"
        source.add_model(model("second"), "BookService.find*").unwrap();

        assert_eq!(source.model(&find_by_isbn()).unwrap().cache_name(), "second");
        assert_eq!(source.model(&find_all()).unwrap().cache_name(), "second");
    }

    #[test]
    fn longer_pattern_registered_later_does_not_rebind() {
        let mut source = MethodMapModelSource::new(registry());
        source.add_model(model("first"), "BookService.find*").unwrap();
        source
            .add_model(model("second"), "BookService.find_by*")
            .unwrap();

        // find_by_isbn stays with the earlier, shorter pattern
        assert_eq!(source.model(&find_by_isbn()).unwrap().cache_name(), "first");
        assert_eq!(source.model(&find_all()).unwrap().cache_name(), "first");
    }

    #[test]
    fn identical_pattern_keeps_first_binding() {
        let mut source = MethodMapModelSource::new(registry());
        source.add_model(model("first"), "BookService.find*").unwrap();
        source.add_model(model("second"), "BookService.find*").unwrap();
        assert_eq!(source.model(&find_by_isbn()).unwrap().cache_name(), "first");
    }

    #[test]
    fn unbound_methods_stay_bindable_by_later_patterns() {
        let mut source = MethodMapModelSource::new(registry());
        source
            .add_model(model("first"), "BookService.find_by_isbn")
            .unwrap();
        source.add_model(model("second"), "BookService.find*").unwrap();

        // find_all had no binding, so the wildcard claims it; find_by_isbn
        // is rebound because the wildcard is shorter than the exact pattern
        assert_eq!(source.model(&find_all()).unwrap().cache_name(), "second");
        assert_eq!(source.model(&find_by_isbn()).unwrap().cache_name(), "second");
    }
}
