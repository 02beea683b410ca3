//! Cache provider facade — the pluggable backend contract.
//!
//! The interceptors never talk to a concrete cache library; they talk to a
//! [`CacheProviderFacade`]. A facade adapts one backend (an in-process
//! store, a distributed cache client, ...) to five operations: get, put,
//! cancel-update, flush, and model validation, plus the "model editor"
//! parsing hooks that turn flat configuration strings into models.
//!
//! Facades must be independently thread-safe; this core performs no
//! locking around facade calls, and concurrent stores for the same key are
//! last-writer-wins.
//!
//! [`MemoryCacheFacade`] is the bundled reference implementation.

mod memory;

pub use memory::{MemoryCacheFacade, MemoryCacheFacadeBuilder, RegionConfig};

use std::any::Any;
use std::sync::Arc;

use crate::error::Result;
use crate::key::HashCodeCacheKey;
use crate::model::{CachingModel, FlushingModel};

/// A stored cache value, type-erased.
///
/// The caching interceptor stores the wrapped operation's return value as
/// `Arc<dyn Any>` and downcasts on retrieval; the concrete type never
/// crosses the facade boundary.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// Adapter between the interception core and one cache backend.
pub trait CacheProviderFacade: Send + Sync {
    /// Retrieve the entry stored under `key`, or `None` on a miss.
    fn get(&self, model: &CachingModel, key: &HashCodeCacheKey) -> Result<Option<CachedValue>>;

    /// Store `value` under `key`. Overwrites any existing entry.
    fn put(&self, model: &CachingModel, key: HashCodeCacheKey, value: CachedValue) -> Result<()>;

    /// Release any state held for a pending update of `key`.
    ///
    /// Called when the wrapped operation fails after a miss. Backends that
    /// lock keys while an update is pending release the lock here; for
    /// everything else the default no-op applies.
    fn cancel_update(&self, _key: &HashCodeCacheKey) -> Result<()> {
        Ok(())
    }

    /// Flush the region(s)/group(s) the model describes.
    fn flush(&self, model: &FlushingModel) -> Result<()>;

    /// Check a caching model against this backend's requirements.
    ///
    /// Runs once at interceptor construction; a failure aborts startup.
    fn validate_caching_model(&self, model: &CachingModel) -> Result<()>;

    /// Check a flushing model against this backend's requirements.
    fn validate_flushing_model(&self, model: &FlushingModel) -> Result<()>;

    /// Parse a flat-string caching model ("model editor").
    ///
    /// The default accepts the standard `cache=...;group=...;ttl=...` form;
    /// facades with richer models override this.
    fn parse_caching_model(&self, text: &str) -> Result<CachingModel> {
        text.parse()
    }

    /// Parse a flat-string flushing model ("model editor").
    fn parse_flushing_model(&self, text: &str) -> Result<FlushingModel> {
        text.parse()
    }
}
