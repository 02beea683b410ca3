//! In-process cache facade backed by moka.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use super::{CacheProviderFacade, CachedValue};
use crate::error::{CacheError, Result};
use crate::key::HashCodeCacheKey;
use crate::model::{CachingModel, FlushingModel};

/// Default maximum number of entries per region.
const DEFAULT_REGION_MAX: u64 = 10_000;

/// Configuration for one in-memory cache region.
///
/// ```rust
/// use std::time::Duration;
/// use muninn::RegionConfig;
///
/// let config = RegionConfig::new("books")
///     .max_entries(50_000)
///     .ttl(Duration::from_secs(3600));
/// ```
#[derive(Clone, Debug)]
pub struct RegionConfig {
    name: String,
    max_entries: u64,
    ttl: Option<Duration>,
}

impl RegionConfig {
    /// Region with the default capacity (10,000 entries) and no expiry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_entries: DEFAULT_REGION_MAX,
            ttl: None,
        }
    }

    /// Set the maximum number of entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Expire entries after the given time-to-live.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

// Stored alongside each value so group flushes can select entries.
#[derive(Clone)]
struct StoredEntry {
    value: CachedValue,
    group: Option<String>,
}

struct Region {
    entries: moka::sync::Cache<HashCodeCacheKey, StoredEntry>,
    ttl: Option<Duration>,
}

/// In-process [`CacheProviderFacade`] with one bounded moka cache per
/// declared region.
///
/// Regions are declared up front on the builder; accessing an undeclared
/// region is an [`CacheError::UnknownRegion`] error, and the model
/// validators reject models naming one at interceptor construction, so
/// misconfiguration surfaces at startup rather than on a live code path.
///
/// ```rust
/// use muninn::MemoryCacheFacade;
///
/// let facade = MemoryCacheFacade::builder()
///     .region("books")
///     .region("authors")
///     .build()
///     .unwrap();
/// ```
pub struct MemoryCacheFacade {
    regions: HashMap<String, Region>,
}

impl MemoryCacheFacade {
    /// Start declaring regions.
    pub fn builder() -> MemoryCacheFacadeBuilder {
        MemoryCacheFacadeBuilder::new()
    }

    /// Names of the declared regions.
    pub fn region_names(&self) -> Vec<&str> {
        self.regions.keys().map(String::as_str).collect()
    }

    /// Number of live entries in a region.
    ///
    /// Returns `UnknownRegion` for an undeclared name.
    pub fn entry_count(&self, region: &str) -> Result<u64> {
        let region = self.region(region)?;
        region.entries.run_pending_tasks();
        Ok(region.entries.entry_count())
    }

    fn region(&self, name: &str) -> Result<&Region> {
        self.regions
            .get(name)
            .ok_or_else(|| CacheError::UnknownRegion(name.to_string()))
    }
}

impl CacheProviderFacade for MemoryCacheFacade {
    fn get(&self, model: &CachingModel, key: &HashCodeCacheKey) -> Result<Option<CachedValue>> {
        let region = self.region(model.cache_name())?;
        Ok(region.entries.get(key).map(|entry| entry.value))
    }

    fn put(&self, model: &CachingModel, key: HashCodeCacheKey, value: CachedValue) -> Result<()> {
        let region = self.region(model.cache_name())?;
        region.entries.insert(
            key,
            StoredEntry {
                value,
                group: model.group_name().map(String::from),
            },
        );
        Ok(())
    }

    fn flush(&self, model: &FlushingModel) -> Result<()> {
        for descriptor in model.regions() {
            let region = self.region(descriptor.name())?;
            if descriptor.group_names().is_empty() {
                debug!(region = descriptor.name(), "flushing entire region");
                region.entries.invalidate_all();
            } else {
                debug!(
                    region = descriptor.name(),
                    groups = ?descriptor.group_names(),
                    "flushing groups"
                );
                let groups = descriptor.group_names().to_vec();
                region
                    .entries
                    .invalidate_entries_if(move |_, entry| {
                        entry
                            .group
                            .as_ref()
                            .is_some_and(|g| groups.iter().any(|flushed| flushed == g))
                    })
                    .map_err(|e| CacheError::Provider(e.to_string()))?;
                // predicate invalidation is lazy; settle it so flushed
                // entries are gone when the caller returns
                region.entries.run_pending_tasks();
            }
        }
        Ok(())
    }

    fn validate_caching_model(&self, model: &CachingModel) -> Result<()> {
        if model.cache_name().is_empty() {
            return Err(CacheError::InvalidCachingModel(
                "empty cache name".to_string(),
            ));
        }
        let Some(region) = self.regions.get(model.cache_name()) else {
            return Err(CacheError::InvalidCachingModel(format!(
                "region '{}' is not declared",
                model.cache_name()
            )));
        };
        match (model.ttl(), region.ttl) {
            (Some(requested), Some(configured)) if requested > configured => {
                Err(CacheError::InvalidCachingModel(format!(
                    "model ttl {requested:?} exceeds region ttl {configured:?}"
                )))
            }
            (Some(_), None) => Err(CacheError::InvalidCachingModel(format!(
                "region '{}' does not expire entries",
                model.cache_name()
            ))),
            _ => Ok(()),
        }
    }

    fn validate_flushing_model(&self, model: &FlushingModel) -> Result<()> {
        if model.regions().is_empty() {
            return Err(CacheError::InvalidFlushingModel(
                "no cache regions configured".to_string(),
            ));
        }
        for descriptor in model.regions() {
            if descriptor.name().is_empty() {
                return Err(CacheError::InvalidFlushingModel(
                    "empty cache name".to_string(),
                ));
            }
            if !self.regions.contains_key(descriptor.name()) {
                return Err(CacheError::InvalidFlushingModel(format!(
                    "region '{}' is not declared",
                    descriptor.name()
                )));
            }
        }
        Ok(())
    }
}

/// Builder collecting [`RegionConfig`]s for a [`MemoryCacheFacade`].
pub struct MemoryCacheFacadeBuilder {
    configs: Vec<RegionConfig>,
}

impl MemoryCacheFacadeBuilder {
    fn new() -> Self {
        Self {
            configs: Vec::new(),
        }
    }

    /// Declare a region with default configuration.
    pub fn region(self, name: impl Into<String>) -> Self {
        self.region_config(RegionConfig::new(name))
    }

    /// Declare a region with explicit configuration.
    pub fn region_config(mut self, config: RegionConfig) -> Self {
        self.configs.push(config);
        self
    }

    /// Build the facade.
    ///
    /// # Errors
    ///
    /// `Configuration` when no regions were declared or a name repeats.
    pub fn build(self) -> Result<MemoryCacheFacade> {
        if self.configs.is_empty() {
            return Err(CacheError::Configuration(
                "at least one cache region must be declared".to_string(),
            ));
        }
        let mut regions = HashMap::new();
        for config in self.configs {
            let mut builder = moka::sync::Cache::builder()
                .max_capacity(config.max_entries)
                .support_invalidation_closures();
            if let Some(ttl) = config.ttl {
                builder = builder.time_to_live(ttl);
            }
            let region = Region {
                entries: builder.build(),
                ttl: config.ttl,
            };
            if regions.insert(config.name.clone(), region).is_some() {
                return Err(CacheError::Configuration(format!(
                    "region '{}' declared twice",
                    config.name
                )));
            }
        }
        Ok(MemoryCacheFacade { regions })
    }
}
