//! Metadata-driven bindings with memoized lookup.

use std::collections::HashMap;

use tracing::debug;

use super::ModelSource;
use crate::invocation::MethodDescriptor;

/// Marker metadata attached to a cacheable method.
///
/// Carries the identifier of the model to use; the owning
/// [`MetadataModelSource`] maps the identifier to the actual model. The
/// analogue of a retained `@Cacheable(modelId = "...")` annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cached {
    model_id: String,
}

impl Cached {
    /// Attribute pointing at the model registered under `model_id`.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
        }
    }

    /// Identifier of the model to apply.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Looks up the [`Cached`] attribute declared for a method, if any.
///
/// Implementations typically consult metadata captured at startup — a
/// derive/macro-generated table, a parsed configuration file, or a plain
/// closure over a map. Any `Fn(&MethodDescriptor) -> Option<Cached>` works
/// directly.
pub trait MetadataFinder: Send + Sync {
    /// The attribute declared on `method`, or `None`.
    fn find(&self, method: &MethodDescriptor) -> Option<Cached>;
}

impl<F> MetadataFinder for F
where
    F: Fn(&MethodDescriptor) -> Option<Cached> + Send + Sync,
{
    fn find(&self, method: &MethodDescriptor) -> Option<Cached> {
        self(method)
    }
}

/// Model source that resolves methods through a [`MetadataFinder`] and a
/// model-id map, memoizing every answer.
///
/// Finder results — including "no attribute" — are cached per descriptor
/// with insert-if-absent semantics, so each method pays the lookup cost
/// once. The memo is owned by this instance and never evicted: its domain
/// is the fixed set of intercepted methods.
pub struct MetadataModelSource<M> {
    finder: Box<dyn MetadataFinder>,
    models: HashMap<String, M>,
    resolved: moka::sync::Cache<MethodDescriptor, Option<Cached>>,
}

impl<M: Clone + Send + Sync> MetadataModelSource<M> {
    /// Create a source from a finder and the id-to-model map it resolves
    /// against.
    pub fn new(finder: impl MetadataFinder + 'static, models: HashMap<String, M>) -> Self {
        Self {
            finder: Box::new(finder),
            models,
            resolved: moka::sync::Cache::builder().build(),
        }
    }

    fn attribute(&self, method: &MethodDescriptor) -> Option<Cached> {
        self.resolved.get_with_by_ref(method, || {
            debug!(method = %method, "resolving metadata attribute");
            self.finder.find(method)
        })
    }
}

impl<M: Clone + Send + Sync + 'static> ModelSource<M> for MetadataModelSource<M> {
    fn model(&self, method: &MethodDescriptor) -> Option<M> {
        let attribute = self.attribute(method)?;
        self.models.get(attribute.model_id()).cloned()
    }

    fn configured_models(&self) -> Vec<M> {
        self.models.values().cloned().collect()
    }
}
