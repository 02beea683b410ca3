//! The caching interceptor.

use std::sync::Arc;

use tracing::{debug, warn};

use super::CachingListener;
use crate::error::{CacheError, Result};
use crate::invocation::Invocation;
use crate::key::{CacheKeyGenerator, HashCodeKeyGenerator};
use crate::model::CachingModel;
use crate::provider::{CacheProviderFacade, CachedValue};
use crate::source::{ModelSource, NameMatchModelSource};
use crate::telemetry;

/// Around-advice that caches the wrapped operation's return value.
///
/// Per invocation: resolve the model for the method (none bound ⇒ invoke
/// the operation directly, bypassing the cache); compute the key; query the
/// provider. A hit returns the stored value without running the operation;
/// a miss runs it, stores the successful result, and returns it. A failed
/// operation is never cached and its error propagates unchanged.
///
/// ```rust
/// use std::sync::Arc;
/// use muninn::{
///     CacheError, CachingInterceptor, CachingModel, Invocation, MemoryCacheFacade,
///     MethodDescriptor, NameMatchModelSource,
/// };
///
/// # fn main() -> muninn::Result<()> {
/// let facade = Arc::new(MemoryCacheFacade::builder().region("books").build()?);
/// let interceptor = CachingInterceptor::builder()
///     .provider(facade)
///     .source(NameMatchModelSource::new().mapping("find*", CachingModel::new("books")))
///     .build()?;
///
/// let method = MethodDescriptor::new("BookService", "find_by_isbn", ["&str"]);
/// let invocation = Invocation::new(&method).arg(&"978-3-16-148410-0");
/// let title: String = interceptor.around(&invocation, || {
///     Ok::<_, CacheError>("Dune".to_string()) // the real lookup
/// })?;
/// assert_eq!(title, "Dune");
/// # Ok(())
/// # }
/// ```
pub struct CachingInterceptor {
    provider: Arc<dyn CacheProviderFacade>,
    source: Box<dyn ModelSource<CachingModel>>,
    key_generator: Box<dyn CacheKeyGenerator>,
    listeners: Vec<Box<dyn CachingListener>>,
}

impl CachingInterceptor {
    /// Start configuring an interceptor.
    pub fn builder() -> CachingInterceptorBuilder {
        CachingInterceptorBuilder::new()
    }

    /// Execute `proceed` with caching semantics.
    ///
    /// `T` must be `Clone` (the stored copy and the returned value are
    /// independent) and `'static` (it is stored type-erased). Provider
    /// failures surface through the caller's error type via
    /// `E: From<CacheError>`.
    pub fn around<T, E, F>(&self, invocation: &Invocation<'_>, proceed: F) -> std::result::Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: From<CacheError>,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let Some(model) = self.source.model(invocation.method()) else {
            return proceed();
        };
        let region = model.cache_name().to_string();
        let key = self.key_generator.generate_key(invocation);

        if let Some(entry) = self.provider.get(&model, &key).map_err(E::from)? {
            if let Some(value) = entry.downcast_ref::<T>() {
                debug!(method = %invocation.method(), %key, region = %region, "cache hit");
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "region" => region).increment(1);
                return Ok(value.clone());
            }
            // only reachable when two invocations collide on the same key
            // with different return types; recompute rather than fail
            warn!(method = %invocation.method(), %key, "cached entry has unexpected type, treating as miss");
        }

        debug!(method = %invocation.method(), %key, region = %region, "cache miss");
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "region" => region.clone()).increment(1);

        let value = match proceed() {
            Ok(value) => value,
            Err(error) => {
                if let Err(cancel_error) = self.provider.cancel_update(&key) {
                    warn!(%key, error = %cancel_error, "failed to cancel pending cache update");
                }
                return Err(error);
            }
        };

        let stored: CachedValue = Arc::new(value.clone());
        self.provider.put(&model, key, stored).map_err(E::from)?;
        metrics::counter!(telemetry::CACHE_PUTS_TOTAL, "region" => region).increment(1);
        for listener in &self.listeners {
            listener.on_caching(&key, &model);
        }
        Ok(value)
    }
}

/// Builder for [`CachingInterceptor`].
///
/// `build()` is the eager-validation point: it requires a provider and a
/// model source (or flat-string name-match models to parse through the
/// provider's editor), validates every configured model against the
/// provider, and defaults the key generator to [`HashCodeKeyGenerator`].
pub struct CachingInterceptorBuilder {
    provider: Option<Arc<dyn CacheProviderFacade>>,
    source: Option<Box<dyn ModelSource<CachingModel>>>,
    name_match_models: Vec<(String, String)>,
    key_generator: Option<Box<dyn CacheKeyGenerator>>,
    listeners: Vec<Box<dyn CachingListener>>,
}

impl CachingInterceptorBuilder {
    fn new() -> Self {
        Self {
            provider: None,
            source: None,
            name_match_models: Vec::new(),
            key_generator: None,
            listeners: Vec::new(),
        }
    }

    /// Set the cache provider facade. Required.
    pub fn provider(mut self, provider: Arc<dyn CacheProviderFacade>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the model source resolving methods to caching models.
    pub fn source(mut self, source: impl ModelSource<CachingModel> + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Add a name-match binding from a method-name pattern to a flat-string
    /// model, parsed through the provider's model editor at `build()`.
    pub fn name_match_model(
        mut self,
        pattern: impl Into<String>,
        model_text: impl Into<String>,
    ) -> Self {
        self.name_match_models.push((pattern.into(), model_text.into()));
        self
    }

    /// Override the key generator (default: [`HashCodeKeyGenerator`]).
    pub fn key_generator(mut self, generator: impl CacheKeyGenerator + 'static) -> Self {
        self.key_generator = Some(Box::new(generator));
        self
    }

    /// Register a listener notified after each store.
    pub fn listener(mut self, listener: impl CachingListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Validate the configuration and build the interceptor.
    ///
    /// # Errors
    ///
    /// - [`CacheError::NoProvider`] without a provider;
    /// - [`CacheError::Configuration`] without models, or with both a
    ///   source and flat-string models;
    /// - [`CacheError::ModelParse`] when a flat-string model fails the
    ///   provider's editor;
    /// - [`CacheError::InvalidCachingModel`] when a model fails provider
    ///   validation.
    pub fn build(self) -> Result<CachingInterceptor> {
        let provider = self.provider.ok_or(CacheError::NoProvider)?;

        let source: Box<dyn ModelSource<CachingModel>> =
            match (self.source, self.name_match_models.is_empty()) {
                (Some(_), false) => {
                    return Err(CacheError::Configuration(
                        "configure either a model source or name-match models, not both"
                            .to_string(),
                    ));
                }
                (Some(source), true) => source,
                (None, false) => {
                    let mut source = NameMatchModelSource::new();
                    for (pattern, text) in self.name_match_models {
                        let model = provider.parse_caching_model(&text)?;
                        source = source.mapping(pattern, model);
                    }
                    Box::new(source)
                }
                (None, true) => {
                    return Err(CacheError::Configuration(
                        "no caching models configured".to_string(),
                    ));
                }
            };

        let models = source.configured_models();
        if models.is_empty() {
            return Err(CacheError::Configuration(
                "no caching models configured".to_string(),
            ));
        }
        for model in &models {
            provider.validate_caching_model(model)?;
        }

        Ok(CachingInterceptor {
            provider,
            source,
            key_generator: self
                .key_generator
                .unwrap_or_else(|| Box::new(HashCodeKeyGenerator::new())),
            listeners: self.listeners,
        })
    }
}
