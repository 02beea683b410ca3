//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;

use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use muninn::{
    CacheError, CachingInterceptor, CachingModel, FlushingInterceptor, FlushingModel, Invocation,
    MemoryCacheFacade, MethodDescriptor, NameMatchModelSource, telemetry,
};

// ============================================================================
// Helpers
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

fn facade() -> Arc<MemoryCacheFacade> {
    Arc::new(
        MemoryCacheFacade::builder()
            .region("books")
            .build()
            .unwrap(),
    )
}

fn caching_interceptor() -> CachingInterceptor {
    CachingInterceptor::builder()
        .provider(facade())
        .source(NameMatchModelSource::new().mapping("find*", CachingModel::new("books")))
        .build()
        .unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn miss_then_hit_records_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let interceptor = caching_interceptor();
        let method = MethodDescriptor::new("BookService", "find_by_isbn", ["&str"]);
        for _ in 0..3 {
            let invocation = Invocation::new(&method).arg(&"isbn-1");
            let _: String = interceptor
                .around(&invocation, || Ok::<_, CacheError>("Dune".to_string()))
                .unwrap();
        }
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 2);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_PUTS_TOTAL), 1);
}

#[test]
fn bypassed_invocations_record_nothing() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let interceptor = caching_interceptor();
        let method = MethodDescriptor::new("BookService", "remove_all", Vec::<String>::new());
        let invocation = Invocation::new(&method);
        let _: u32 = interceptor
            .around(&invocation, || Ok::<_, CacheError>(1))
            .unwrap();
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 0);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 0);
}

#[test]
fn failed_operation_records_a_miss_but_no_put() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let interceptor = caching_interceptor();
        let method = MethodDescriptor::new("BookService", "find_by_isbn", ["&str"]);
        let invocation = Invocation::new(&method).arg(&"isbn-1");
        let _: Result<String, CacheError> = interceptor
            .around(&invocation, || Err(CacheError::Provider("down".to_string())));
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_PUTS_TOTAL), 0);
}

#[test]
fn flushes_record_one_count_per_region() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let facade = Arc::new(
            MemoryCacheFacade::builder()
                .region("books")
                .region("authors")
                .build()
                .unwrap(),
        );
        let interceptor = FlushingInterceptor::builder()
            .provider(facade)
            .name_match_model("save*", "cache=books|cache=authors")
            .build()
            .unwrap();

        let method = MethodDescriptor::new("BookService", "save_book", ["Book"]);
        let invocation = Invocation::new(&method).arg(&"dune");
        interceptor
            .around(&invocation, || Ok::<_, CacheError>(()))
            .unwrap();
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_FLUSHES_TOTAL), 2);
}

#[test]
fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let interceptor = caching_interceptor();
    let method = MethodDescriptor::new("BookService", "find_by_isbn", ["&str"]);
    let invocation = Invocation::new(&method).arg(&"isbn-1");
    let _: String = interceptor
        .around(&invocation, || Ok::<_, CacheError>("Dune".to_string()))
        .unwrap();
}
