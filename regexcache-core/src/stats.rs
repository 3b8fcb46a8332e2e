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

//! A consistent, lock-free snapshot of everything `statistics()` reports.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Point-in-time counters and gauges, independent of whatever
/// [`regexcache_common::metrics::MetricsSink`] is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct Statistics {
    pub patterns_compiled_total: u64,
    pub cache_hits_total: u64,
    pub cache_misses_total: u64,
    pub invalid_recompiled_total: u64,
    pub evictions_lru_total: u64,
    pub evictions_idle_total: u64,
    pub evictions_deferred_total: u64,
    pub matching_operations_total: u64,
    pub errors_compilation_failed_total: u64,
    pub errors_resource_exhausted_total: u64,
    pub errors_native_library_total: u64,
    pub resources_patterns_freed_total: u64,
    pub resources_matchers_freed_total: u64,
    pub cache_patterns_current: usize,
    pub cache_native_memory_current: usize,
    pub cache_native_memory_peak: usize,
    pub cache_deferred_patterns_current: usize,
    pub cache_deferred_patterns_peak: usize,
    pub cache_deferred_native_memory_current: usize,
    pub cache_deferred_native_memory_peak: usize,
    pub resources_patterns_active_current: usize,
    pub resources_matchers_active_current: usize,
}

/// The live, atomic counters backing a [`Statistics`] snapshot.
///
/// One field per counter/gauge named in `names`, so `snapshot()` never
/// needs a lock — every field is `Relaxed`-or-stronger atomic and the
/// snapshot itself is only ever approximately consistent across fields,
/// which matches what an operator expects from a live counters page.
#[derive(Debug, Default)]
pub struct LiveCounters {
    pub patterns_compiled_total: AtomicU64,
    pub cache_hits_total: AtomicU64,
    pub cache_misses_total: AtomicU64,
    pub invalid_recompiled_total: AtomicU64,
    pub evictions_lru_total: AtomicU64,
    pub evictions_idle_total: AtomicU64,
    pub evictions_deferred_total: AtomicU64,
    pub matching_operations_total: AtomicU64,
    pub errors_compilation_failed_total: AtomicU64,
    pub errors_resource_exhausted_total: AtomicU64,
    pub errors_native_library_total: AtomicU64,
    pub resources_patterns_freed_total: AtomicU64,
    pub resources_matchers_freed_total: AtomicU64,
    pub cache_native_memory_current: AtomicUsize,
    pub cache_native_memory_peak: AtomicUsize,
    pub cache_deferred_patterns_current: AtomicUsize,
    pub cache_deferred_patterns_peak: AtomicUsize,
    pub cache_deferred_native_memory_current: AtomicUsize,
    pub cache_deferred_native_memory_peak: AtomicUsize,
}

impl LiveCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_compile(&self) {
        Self::bump(&self.patterns_compiled_total);
    }

    pub fn record_hit(&self) {
        Self::bump(&self.cache_hits_total);
    }

    pub fn record_miss(&self) {
        Self::bump(&self.cache_misses_total);
    }

    pub fn record_invalid_recompiled(&self) {
        Self::bump(&self.invalid_recompiled_total);
    }

    pub fn record_eviction_lru(&self) {
        Self::bump(&self.evictions_lru_total);
    }

    pub fn record_eviction_idle(&self) {
        Self::bump(&self.evictions_idle_total);
    }

    pub fn record_eviction_deferred(&self) {
        Self::bump(&self.evictions_deferred_total);
    }

    pub fn record_matching_operation(&self) {
        Self::bump(&self.matching_operations_total);
    }

    pub fn record_error_compilation_failed(&self) {
        Self::bump(&self.errors_compilation_failed_total);
    }

    pub fn record_error_resource_exhausted(&self) {
        Self::bump(&self.errors_resource_exhausted_total);
    }

    pub fn record_error_native_library(&self) {
        Self::bump(&self.errors_native_library_total);
    }

    pub fn record_patterns_freed(&self) {
        Self::bump(&self.resources_patterns_freed_total);
    }

    pub fn record_matchers_freed(&self) {
        Self::bump(&self.resources_matchers_freed_total);
    }

    /// Add `bytes` to the running `current_memory_bytes` sum (invariant
    /// 4: it equals the sum of `byte_cost` over the main index), tracking
    /// the running peak.
    pub fn add_native_memory_bytes(&self, bytes: usize) {
        let new_value = self.cache_native_memory_current.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.cache_native_memory_peak.fetch_max(new_value, Ordering::Relaxed);
    }

    /// Subtract `bytes` from the running `current_memory_bytes` sum, on
    /// eviction from the main index.
    pub fn sub_native_memory_bytes(&self, bytes: usize) {
        self.cache_native_memory_current.fetch_sub(bytes, Ordering::Relaxed);
    }

    /// Update the deferred-queue patterns gauge, tracking its peak.
    pub fn set_deferred_patterns_current(&self, count: usize) {
        self.cache_deferred_patterns_current.store(count, Ordering::Relaxed);
        self.cache_deferred_patterns_peak.fetch_max(count, Ordering::Relaxed);
    }

    /// Update the deferred-queue native-memory gauge, tracking its peak.
    pub fn set_deferred_native_memory_current(&self, bytes: usize) {
        self.cache_deferred_native_memory_current.store(bytes, Ordering::Relaxed);
        self.cache_deferred_native_memory_peak.fetch_max(bytes, Ordering::Relaxed);
    }

    /// Reset every cumulative counter and peak gauge to zero. Test-only:
    /// `PatternCache::reset` is the sole caller.
    pub fn reset_all(&self) {
        for counter in [
            &self.patterns_compiled_total,
            &self.cache_hits_total,
            &self.cache_misses_total,
            &self.invalid_recompiled_total,
            &self.evictions_lru_total,
            &self.evictions_idle_total,
            &self.evictions_deferred_total,
            &self.matching_operations_total,
            &self.errors_compilation_failed_total,
            &self.errors_resource_exhausted_total,
            &self.errors_native_library_total,
            &self.resources_patterns_freed_total,
            &self.resources_matchers_freed_total,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        for gauge in [
            &self.cache_native_memory_current,
            &self.cache_native_memory_peak,
            &self.cache_deferred_patterns_current,
            &self.cache_deferred_patterns_peak,
            &self.cache_deferred_native_memory_current,
            &self.cache_deferred_native_memory_peak,
        ] {
            gauge.store(0, Ordering::Relaxed);
        }
    }

    fn read(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    fn read_usize(gauge: &AtomicUsize) -> usize {
        gauge.load(Ordering::Relaxed)
    }

    /// Build a point-in-time [`Statistics`] snapshot, filling in the
    /// gauges this struct does not itself own (current pattern count,
    /// active handles/matchers) from their respective owners.
    pub fn snapshot(
        &self,
        cache_patterns_current: usize,
        resources_patterns_active_current: usize,
        resources_matchers_active_current: usize,
    ) -> Statistics {
        Statistics {
            patterns_compiled_total: Self::read(&self.patterns_compiled_total),
            cache_hits_total: Self::read(&self.cache_hits_total),
            cache_misses_total: Self::read(&self.cache_misses_total),
            invalid_recompiled_total: Self::read(&self.invalid_recompiled_total),
            evictions_lru_total: Self::read(&self.evictions_lru_total),
            evictions_idle_total: Self::read(&self.evictions_idle_total),
            evictions_deferred_total: Self::read(&self.evictions_deferred_total),
            matching_operations_total: Self::read(&self.matching_operations_total),
            errors_compilation_failed_total: Self::read(&self.errors_compilation_failed_total),
            errors_resource_exhausted_total: Self::read(&self.errors_resource_exhausted_total),
            errors_native_library_total: Self::read(&self.errors_native_library_total),
            resources_patterns_freed_total: Self::read(&self.resources_patterns_freed_total),
            resources_matchers_freed_total: Self::read(&self.resources_matchers_freed_total),
            cache_patterns_current,
            cache_native_memory_current: Self::read_usize(&self.cache_native_memory_current),
            cache_native_memory_peak: Self::read_usize(&self.cache_native_memory_peak),
            cache_deferred_patterns_current: Self::read_usize(&self.cache_deferred_patterns_current),
            cache_deferred_patterns_peak: Self::read_usize(&self.cache_deferred_patterns_peak),
            cache_deferred_native_memory_current: Self::read_usize(
                &self.cache_deferred_native_memory_current,
            ),
            cache_deferred_native_memory_peak: Self::read_usize(&self.cache_deferred_native_memory_peak),
            resources_patterns_active_current,
            resources_matchers_active_current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn snapshot_reflects_recorded_events() {
        let counters = LiveCounters::default();
        counters.record_compile();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        let snapshot = counters.snapshot(2, 2, 0);
        assert_eq!(snapshot.patterns_compiled_total, 1);
        assert_eq!(snapshot.cache_hits_total, 2);
        assert_eq!(snapshot.cache_misses_total, 1);
        assert_eq!(snapshot.cache_patterns_current, 2);
    }

    #[test_log::test]
    fn memory_gauge_tracks_peak_across_decreases() {
        let counters = LiveCounters::default();
        counters.add_native_memory_bytes(1000);
        counters.sub_native_memory_bytes(600);
        let snapshot = counters.snapshot(0, 0, 0);
        assert_eq!(snapshot.cache_native_memory_current, 400);
        assert_eq!(snapshot.cache_native_memory_peak, 1000);
    }
}
