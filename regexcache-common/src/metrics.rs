//  Copyright 2026 The Regexcache Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! The metrics sink contract the pattern cache publishes through.
//!
//! The cache never depends on a concrete metrics backend. It emits names
//! from the closed set in [`names`] against whatever [`MetricsSink`] was
//! configured; the default does nothing, so a caller who never wires up
//! observability pays no cost beyond a vtable call that inlines away in
//! release builds behind `#[inline]`.

use std::{sync::Arc, time::Duration};

/// The complete, closed set of metric names the cache publishes.
///
/// Kept as plain `&'static str` constants rather than an enum so a sink
/// forwarding to an external system (Prometheus, `metrics`, statsd) can
/// use the name directly as the external metric's name.
pub mod names {
    // Counters
    pub const PATTERNS_COMPILED_TOTAL: &str = "patterns.compiled.total.count";
    pub const CACHE_HITS_TOTAL: &str = "patterns.cache.hits.total.count";
    pub const CACHE_MISSES_TOTAL: &str = "patterns.cache.misses.total.count";
    pub const INVALID_RECOMPILED_TOTAL: &str = "patterns.invalid.recompiled.total.count";
    pub const EVICTIONS_LRU_TOTAL: &str = "cache.evictions.lru.total.count";
    pub const EVICTIONS_IDLE_TOTAL: &str = "cache.evictions.idle.total.count";
    pub const EVICTIONS_DEFERRED_TOTAL: &str = "cache.evictions.deferred.total.count";
    pub const MATCHING_OPERATIONS_TOTAL: &str = "matching.operations.total.count";
    pub const ERRORS_COMPILATION_FAILED_TOTAL: &str = "errors.compilation.failed.total.count";
    pub const ERRORS_RESOURCE_EXHAUSTED_TOTAL: &str = "errors.resource.exhausted.total.count";
    pub const ERRORS_NATIVE_LIBRARY_TOTAL: &str = "errors.native_library.total.count";
    pub const RESOURCES_PATTERNS_FREED_TOTAL: &str = "resources.patterns.freed.total.count";
    pub const RESOURCES_MATCHERS_FREED_TOTAL: &str = "resources.matchers.freed.total.count";

    // Latencies (nanoseconds)
    pub const PATTERNS_COMPILATION_LATENCY: &str = "patterns.compilation.latency";
    pub const MATCHING_FULL_MATCH_LATENCY: &str = "matching.full_match.latency";
    pub const MATCHING_PARTIAL_MATCH_LATENCY: &str = "matching.partial_match.latency";

    // Gauges
    pub const CACHE_PATTERNS_CURRENT: &str = "cache.patterns.current.count";
    pub const CACHE_NATIVE_MEMORY_CURRENT: &str = "cache.native_memory.current.bytes";
    pub const CACHE_NATIVE_MEMORY_PEAK: &str = "cache.native_memory.peak.bytes";
    pub const CACHE_DEFERRED_PATTERNS_CURRENT: &str = "cache.deferred.patterns.current.count";
    pub const CACHE_DEFERRED_PATTERNS_PEAK: &str = "cache.deferred.patterns.peak.count";
    pub const CACHE_DEFERRED_NATIVE_MEMORY_CURRENT: &str =
        "cache.deferred.native_memory.current.bytes";
    pub const CACHE_DEFERRED_NATIVE_MEMORY_PEAK: &str = "cache.deferred.native_memory.peak.bytes";
    pub const RESOURCES_PATTERNS_ACTIVE_CURRENT: &str = "resources.patterns.active.current.count";
    pub const RESOURCES_MATCHERS_ACTIVE_CURRENT: &str = "resources.matchers.active.current.count";
}

/// A supplier polled by a sink's gauge registration, matching how the
/// `metrics` crate's `describe_gauge!`/closure-based gauges work.
pub type GaugeSupplier = Arc<dyn Fn() -> f64 + Send + Sync + 'static>;

/// Abstract contract for publishing cache metrics to an external system.
///
/// Implementors must be cheap to invoke on the hot path: `increment_counter`
/// and `record_latency` are called on every cache hit/miss and every match
/// operation.
pub trait MetricsSink: Send + Sync + 'static {
    /// Increment a named counter by one.
    fn increment_counter(&self, name: &'static str);

    /// Record a latency observation, in nanoseconds, for a named
    /// histogram-capable metric.
    fn record_latency(&self, name: &'static str, duration: Duration);

    /// Register a gauge under `name`, backed by `supplier`. Implementors
    /// that do not support gauge polling may ignore this; the cache still
    /// maintains its own internal gauges for `statistics()`.
    fn register_gauge(&self, name: &'static str, supplier: GaugeSupplier);
}

impl<T: MetricsSink + ?Sized> MetricsSink for Arc<T> {
    fn increment_counter(&self, name: &'static str) {
        (**self).increment_counter(name)
    }

    fn record_latency(&self, name: &'static str, duration: Duration) {
        (**self).record_latency(name, duration)
    }

    fn register_gauge(&self, name: &'static str, supplier: GaugeSupplier) {
        (**self).register_gauge(name, supplier)
    }
}

/// The default no-op sink. Used when no sink is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    #[inline]
    fn increment_counter(&self, _name: &'static str) {}

    #[inline]
    fn record_latency(&self, _name: &'static str, _duration: Duration) {}

    #[inline]
    fn register_gauge(&self, _name: &'static str, _supplier: GaugeSupplier) {}
}

/// A development-friendly sink that logs every event via `tracing`.
///
/// Not meant for production use (logging on every cache hit is noisy and
/// slow); it exists so a user can see the metric stream without wiring up
/// a real backend, and so this crate exercises its own `MetricsSink`
/// contract end to end in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn increment_counter(&self, name: &'static str) {
        tracing::trace!(metric = name, "counter incremented");
    }

    fn record_latency(&self, name: &'static str, duration: Duration) {
        tracing::trace!(metric = name, nanos = duration.as_nanos() as u64, "latency recorded");
    }

    fn register_gauge(&self, name: &'static str, supplier: GaugeSupplier) {
        tracing::debug!(metric = name, value = supplier(), "gauge registered");
    }
}

#[cfg(feature = "metrics-recorder")]
mod recorder {
    use std::time::Duration;

    use super::{GaugeSupplier, MetricsSink};

    /// Forwards to whatever global [`metrics::Recorder`] the host process
    /// installed, letting operators plug the cache into Prometheus,
    /// statsd, or any other `metrics`-ecosystem exporter without this
    /// crate depending on one directly.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct RecorderMetricsSink;

    impl MetricsSink for RecorderMetricsSink {
        fn increment_counter(&self, name: &'static str) {
            metrics::counter!(name).increment(1);
        }

        fn record_latency(&self, name: &'static str, duration: Duration) {
            metrics::histogram!(name).record(duration.as_nanos() as f64);
        }

        fn register_gauge(&self, name: &'static str, supplier: GaugeSupplier) {
            let gauge = metrics::gauge!(name);
            gauge.set(supplier());
        }
    }
}

#[cfg(feature = "metrics-recorder")]
pub use recorder::RecorderMetricsSink;
