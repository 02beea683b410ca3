//! Muninn - declarative method-result caching and cache invalidation
//!
//! This crate lets application code wrap logical operations with caching
//! and cache-flushing semantics declared as configuration, without
//! embedding cache-provider-specific code at the call sites. Interceptors
//! dispatch to a pluggable [`CacheProviderFacade`]; an in-process
//! [`MemoryCacheFacade`] backed by moka ships with the crate.
//!
//! # Caching Example
//!
//! ```rust
//! use std::sync::Arc;
//! use muninn::{
//!     CacheError, CachingInterceptor, CachingModel, Invocation, MemoryCacheFacade,
//!     MethodDescriptor, NameMatchModelSource,
//! };
//!
//! fn main() -> muninn::Result<()> {
//!     let facade = Arc::new(MemoryCacheFacade::builder().region("books").build()?);
//!
//!     let interceptor = CachingInterceptor::builder()
//!         .provider(facade)
//!         .source(NameMatchModelSource::new().mapping("find*", CachingModel::new("books")))
//!         .build()?;
//!
//!     let method = MethodDescriptor::new("BookService", "find_by_isbn", ["&str"]);
//!     let invocation = Invocation::new(&method).arg(&"978-3-16-148410-0");
//!
//!     // first call runs the closure and stores the result; an identical
//!     // later invocation is served from the cache
//!     let title: String = interceptor.around(&invocation, || {
//!         Ok::<_, CacheError>("Dune".to_string())
//!     })?;
//!     assert_eq!(title, "Dune");
//!     Ok(())
//! }
//! ```
//!
//! # Flushing Example
//!
//! ```rust
//! use std::sync::Arc;
//! use muninn::{CacheError, FlushingInterceptor, FlushingModel, Invocation, MemoryCacheFacade,
//!     MethodDescriptor, NameMatchModelSource};
//!
//! fn main() -> muninn::Result<()> {
//!     let facade = Arc::new(MemoryCacheFacade::builder().region("books").build()?);
//!
//!     let interceptor = FlushingInterceptor::builder()
//!         .provider(facade)
//!         .source(NameMatchModelSource::new().mapping("save*", FlushingModel::new("books")))
//!         .build()?;
//!
//!     let method = MethodDescriptor::new("BookService", "save_book", ["Book"]);
//!     let invocation = Invocation::new(&method).arg(&"dune");
//!     interceptor.around(&invocation, || Ok::<_, CacheError>(()))?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod interceptor;
pub mod invocation;
pub mod key;
pub mod model;
pub mod provider;
pub mod source;
pub mod telemetry;

// Re-export main types at crate root
pub use error::{CacheError, Result};
pub use interceptor::{
    CachingInterceptor, CachingInterceptorBuilder, CachingListener, FlushingInterceptor,
    FlushingInterceptorBuilder,
};
pub use invocation::{ArgumentDigest, Invocation, MethodDescriptor, MethodRegistry};
pub use key::{CacheKeyGenerator, HashCodeCacheKey, HashCodeCalculator, HashCodeKeyGenerator};
pub use model::{CacheRegion, CachingModel, FlushingModel};
pub use provider::{
    CacheProviderFacade, CachedValue, MemoryCacheFacade, MemoryCacheFacadeBuilder, RegionConfig,
};
pub use source::{
    Cached, MetadataFinder, MetadataModelSource, MethodMapModelSource, ModelSource,
    NameMatchModelSource,
};
