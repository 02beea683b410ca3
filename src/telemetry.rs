//! Telemetry metric name constants.
//!
//! Centralised metric names for muninn operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `muninn_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `region` — cache region name from the resolved model

/// Total cache hits observed by the caching interceptor.
///
/// Labels: `region`.
pub const CACHE_HITS_TOTAL: &str = "muninn_cache_hits_total";

/// Total cache misses observed by the caching interceptor.
///
/// Labels: `region`.
pub const CACHE_MISSES_TOTAL: &str = "muninn_cache_misses_total";

/// Total values stored after a miss.
///
/// Labels: `region`.
pub const CACHE_PUTS_TOTAL: &str = "muninn_cache_puts_total";

/// Total flush operations issued by the flushing interceptor.
///
/// Labels: `region`.
pub const CACHE_FLUSHES_TOTAL: &str = "muninn_cache_flushes_total";
