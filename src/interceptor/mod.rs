//! Caching and flushing interceptors.
//!
//! An interceptor wraps a "real operation" — any closure returning
//! `Result<T, E>` — with declarative cache semantics. The caller hands it
//! an [`Invocation`](crate::Invocation) describing the method being
//! executed plus the `proceed` closure; the interceptor decides whether the
//! closure runs at all:
//!
//! - [`CachingInterceptor`] consults the cache first and only invokes the
//!   closure on a miss, storing the result afterwards.
//! - [`FlushingInterceptor`] invalidates cache regions before or after the
//!   closure runs.
//!
//! Both resolve the invocation's method through a
//! [`ModelSource`](crate::ModelSource); an unbound method is passed through
//! untouched. Both are built through builders whose `build()` performs all
//! configuration validation eagerly — a missing provider, an empty model
//! map, or a model the provider rejects never makes it past startup.

mod caching;
mod flushing;

pub use caching::{CachingInterceptor, CachingInterceptorBuilder};
pub use flushing::{FlushingInterceptor, FlushingInterceptorBuilder};

use crate::key::HashCodeCacheKey;
use crate::model::CachingModel;

/// Observer notified after the caching interceptor stores a value.
///
/// Listeners run synchronously on the intercepted call's thread, after the
/// store succeeds. Keep them cheap.
pub trait CachingListener: Send + Sync {
    /// A value was stored under `key` per `model`.
    fn on_caching(&self, key: &HashCodeCacheKey, model: &CachingModel);
}
