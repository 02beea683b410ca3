//! The flushing interceptor.

use std::sync::Arc;

use tracing::debug;

use crate::error::{CacheError, Result};
use crate::invocation::Invocation;
use crate::model::FlushingModel;
use crate::provider::CacheProviderFacade;
use crate::source::{ModelSource, NameMatchModelSource};
use crate::telemetry;

/// Around-advice that invalidates cache regions around the wrapped
/// operation.
///
/// The resolved model decides the timing: flush-before runs the flush and
/// then the operation; flush-after runs the operation first and flushes
/// only when it succeeds — a failed operation propagates its error
/// unchanged and leaves the cache untouched. Methods without a bound model
/// pass through.
pub struct FlushingInterceptor {
    provider: Arc<dyn CacheProviderFacade>,
    source: Box<dyn ModelSource<FlushingModel>>,
}

impl FlushingInterceptor {
    /// Start configuring an interceptor.
    pub fn builder() -> FlushingInterceptorBuilder {
        FlushingInterceptorBuilder::new()
    }

    /// Execute `proceed` with flushing semantics.
    pub fn around<T, E, F>(&self, invocation: &Invocation<'_>, proceed: F) -> std::result::Result<T, E>
    where
        E: From<CacheError>,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let Some(model) = self.source.model(invocation.method()) else {
            return proceed();
        };

        if model.flush_before() {
            self.flush(invocation, &model).map_err(E::from)?;
            proceed()
        } else {
            let value = proceed()?;
            self.flush(invocation, &model).map_err(E::from)?;
            Ok(value)
        }
    }

    fn flush(&self, invocation: &Invocation<'_>, model: &FlushingModel) -> Result<()> {
        debug!(method = %invocation.method(), regions = model.regions().len(), "flushing");
        self.provider.flush(model)?;
        for region in model.regions() {
            metrics::counter!(
                telemetry::CACHE_FLUSHES_TOTAL,
                "region" => region.name().to_string()
            )
            .increment(1);
        }
        Ok(())
    }
}

/// Builder for [`FlushingInterceptor`].
///
/// Mirrors the caching builder: `build()` requires a provider and a model
/// source (or flat-string name-match models parsed through the provider's
/// editor) and validates every configured model eagerly.
pub struct FlushingInterceptorBuilder {
    provider: Option<Arc<dyn CacheProviderFacade>>,
    source: Option<Box<dyn ModelSource<FlushingModel>>>,
    name_match_models: Vec<(String, String)>,
}

impl FlushingInterceptorBuilder {
    fn new() -> Self {
        Self {
            provider: None,
            source: None,
            name_match_models: Vec::new(),
        }
    }

    /// Set the cache provider facade. Required.
    pub fn provider(mut self, provider: Arc<dyn CacheProviderFacade>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the model source resolving methods to flushing models.
    pub fn source(mut self, source: impl ModelSource<FlushingModel> + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Add a name-match binding from a method-name pattern to a flat-string
    /// flushing model, parsed through the provider's model editor at
    /// `build()`.
    pub fn name_match_model(
        mut self,
        pattern: impl Into<String>,
        model_text: impl Into<String>,
    ) -> Self {
        self.name_match_models.push((pattern.into(), model_text.into()));
        self
    }

    /// Validate the configuration and build the interceptor.
    pub fn build(self) -> Result<FlushingInterceptor> {
        let provider = self.provider.ok_or(CacheError::NoProvider)?;

        let source: Box<dyn ModelSource<FlushingModel>> =
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
                        let model = provider.parse_flushing_model(&text)?;
                        source = source.mapping(pattern, model);
                    }
                    Box::new(source)
                }
                (None, true) => {
                    return Err(CacheError::Configuration(
                        "no flushing models configured".to_string(),
                    ));
                }
            };

        let models = source.configured_models();
        if models.is_empty() {
            return Err(CacheError::Configuration(
                "no flushing models configured".to_string(),
            ));
        }
        for model in &models {
            provider.validate_flushing_model(model)?;
        }

        Ok(FlushingInterceptor { provider, source })
    }
}
