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

//! The concurrent fingerprint-keyed pattern cache: the coordination
//! layer's heart.
//!
//! The main index is sharded — a fixed number of independently-locked
//! `hashbrown::HashMap`s, picked by hashing the fingerprint — so
//! concurrent callers on different patterns never contend on the same
//! mutex. Within a shard, reads and single-flight inserts are guarded by
//! a short critical section (`parking_lot::Mutex`); nothing expensive
//! (compilation, engine calls) happens while a shard lock is held.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use hashbrown::HashMap;
use parking_lot::Mutex;
use rand::Rng;
use tokio::sync::Notify;
use tracing::{debug, warn};

use regexcache_common::clock::{Clock, MonotonicClock};
use regexcache_common::error::Error;
use regexcache_common::metrics::{names, GaugeSupplier, MetricsSink, NoopMetricsSink};
use regexcache_common::Result;
use regexcache_engine::Engine;

use crate::config::PatternCacheConfig;
use crate::deferred::DeferredQueue;
use crate::entry::{CachedEntry, Entry};
use crate::fingerprint::Fingerprint;
use crate::resource_tracker::ResourceTracker;
use crate::shared::Shared;
use crate::stats::{LiveCounters, Statistics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvictionKind {
    Lru,
    Idle,
    Invalid,
    Clear,
}

struct Shard<E: Engine> {
    index: HashMap<Fingerprint, Arc<Entry<E>>, ahash::RandomState>,
    in_flight: HashMap<Fingerprint, Arc<Notify>, ahash::RandomState>,
}

impl<E: Engine> Default for Shard<E> {
    fn default() -> Self {
        Self {
            index: HashMap::with_hasher(ahash::RandomState::new()),
            in_flight: HashMap::with_hasher(ahash::RandomState::new()),
        }
    }
}

/// The concurrent pattern cache.
///
/// Construct with [`PatternCache::spawn`], which returns an `Arc` and
/// starts the three background workers (idle sweeper, LRU trim worker,
/// deferred-release sweeper) on the current Tokio runtime. Each worker
/// holds only a [`Weak`] reference to the cache, so they exit on their
/// own once the last `Arc` is dropped — there is no explicit shutdown
/// call to make.
pub struct PatternCache<E: Engine, C: Clock = MonotonicClock, S: MetricsSink = NoopMetricsSink> {
    shared: Arc<Shared<E, C, S>>,
    config: PatternCacheConfig,
    shards: Vec<Mutex<Shard<E>>>,
    deferred: Arc<DeferredQueue<E>>,
    len: AtomicUsize,
    lru_notify: Notify,
    hash_builder: ahash::RandomState,
}

impl<E: Engine, C: Clock, S: MetricsSink> PatternCache<E, C, S> {
    /// Build and spawn a new cache with explicit collaborators — used by
    /// tests that need a deterministic [`Clock`] or a capturing
    /// [`MetricsSink`]. Production callers typically use the facade
    /// crate's default construction instead.
    pub fn spawn(engine: E, clock: C, sink: S, config: PatternCacheConfig) -> Arc<Self> {
        let shards = (0..config.shards().max(1)).map(|_| Mutex::new(Shard::default())).collect();
        let shared = Arc::new(Shared {
            engine: Arc::new(engine),
            clock,
            sink,
            tracker: ResourceTracker::new(config.max_active_handles()),
            counters: LiveCounters::default(),
        });
        let cache = Arc::new(Self {
            shared,
            config,
            shards,
            deferred: Arc::new(DeferredQueue::default()),
            len: AtomicUsize::new(0),
            lru_notify: Notify::new(),
            hash_builder: ahash::RandomState::new(),
        });
        cache.spawn_background_workers();
        cache.register_gauges();
        cache
    }

    /// Register every published gauge with the configured sink, each
    /// backed by a closure that reads back through a [`Weak`] so the
    /// sink never keeps the cache alive past its last `Arc`.
    fn register_gauges(self: &Arc<Self>) {
        let gauges: &[(&'static str, fn(&Statistics) -> f64)] = &[
            (names::CACHE_PATTERNS_CURRENT, |s| s.cache_patterns_current as f64),
            (names::CACHE_NATIVE_MEMORY_CURRENT, |s| s.cache_native_memory_current as f64),
            (names::CACHE_NATIVE_MEMORY_PEAK, |s| s.cache_native_memory_peak as f64),
            (names::CACHE_DEFERRED_PATTERNS_CURRENT, |s| s.cache_deferred_patterns_current as f64),
            (names::CACHE_DEFERRED_PATTERNS_PEAK, |s| s.cache_deferred_patterns_peak as f64),
            (names::CACHE_DEFERRED_NATIVE_MEMORY_CURRENT, |s| {
                s.cache_deferred_native_memory_current as f64
            }),
            (names::CACHE_DEFERRED_NATIVE_MEMORY_PEAK, |s| s.cache_deferred_native_memory_peak as f64),
            (names::RESOURCES_PATTERNS_ACTIVE_CURRENT, |s| s.resources_patterns_active_current as f64),
            (names::RESOURCES_MATCHERS_ACTIVE_CURRENT, |s| s.resources_matchers_active_current as f64),
        ];

        for (name, read) in gauges.iter().copied() {
            let weak = Arc::downgrade(self);
            let supplier: GaugeSupplier = Arc::new(move || {
                weak.upgrade().map(|cache| read(&cache.statistics())).unwrap_or(0.0)
            });
            self.shared.sink.register_gauge(name, supplier);
        }
    }

    fn spawn_background_workers(self: &Arc<Self>) {
        let idle_weak = Arc::downgrade(self);
        let idle_period = self.config.idle_scan_period();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(idle_period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(cache) = idle_weak.upgrade() else { break };
                cache.sweep_idle();
            }
        });

        let lru_weak = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                let Some(cache) = lru_weak.upgrade() else { break };
                cache.lru_notify.notified().await;
                drop(cache);
                let Some(cache) = lru_weak.upgrade() else { break };
                cache.trim_lru();
            }
        });

        let deferred_weak = Arc::downgrade(self);
        let deferred_period = self.config.deferred_cleanup_period();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(deferred_period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(cache) = deferred_weak.upgrade() else { break };
                cache.sweep_deferred();
            }
        });
    }

    /// This cache's configuration.
    pub fn config(&self) -> &PatternCacheConfig {
        &self.config
    }

    fn shard_index(&self, fingerprint: &Fingerprint) -> usize {
        use std::hash::{BuildHasher, Hash, Hasher};
        let mut hasher = self.hash_builder.build_hasher();
        fingerprint.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    /// Get-or-compile: the cache's primary operation. Returns a
    /// [`CachedEntry`] owning one reference, whether served from a hit
    /// or freshly compiled via single-flight.
    pub async fn get_or_compile(&self, fingerprint: Fingerprint) -> Result<CachedEntry<E, C, S>> {
        if !self.config.cache_enabled() {
            return self.compile_uncached(&fingerprint).await;
        }

        loop {
            let shard_idx = self.shard_index(&fingerprint);

            let probed = {
                let shard = self.shards[shard_idx].lock();
                shard.index.get(&fingerprint).cloned()
            };

            if let Some(entry) = probed {
                if self.config.validate_on_hit() && !self.shared.engine.is_ok(entry.handle()) {
                    self.shared.counters.record_invalid_recompiled();
                    self.shared.sink.increment_counter(names::INVALID_RECOMPILED_TOTAL);
                    self.evict_entry(shard_idx, &fingerprint, EvictionKind::Invalid);
                    continue;
                }

                return match entry.try_acquire(self.config.max_matchers_per_entry()) {
                    Ok(()) => {
                        entry.touch(self.shared.clock.now_nanos());
                        self.shared.counters.record_hit();
                        self.shared.sink.increment_counter(names::CACHE_HITS_TOTAL);
                        Ok(CachedEntry::new(entry, Arc::clone(&self.shared)))
                    }
                    Err(err) => {
                        self.shared.counters.record_error_resource_exhausted();
                        self.shared.sink.increment_counter(names::ERRORS_RESOURCE_EXHAUSTED_TOTAL);
                        Err(err)
                    }
                };
            }

            let notify = {
                let mut shard = self.shards[shard_idx].lock();
                if shard.index.contains_key(&fingerprint) {
                    None
                } else if let Some(existing) = shard.in_flight.get(&fingerprint) {
                    Some(Arc::clone(existing))
                } else {
                    let notify = Arc::new(Notify::new());
                    shard.in_flight.insert(fingerprint.clone(), Arc::clone(&notify));
                    None
                }
            };

            match notify {
                Some(notify) => {
                    notify.notified().await;
                    continue;
                }
                None if self.shards[shard_idx].lock().index.contains_key(&fingerprint) => continue,
                None => {}
            }

            let result = self.compile_and_insert(shard_idx, &fingerprint).await;
            {
                let mut shard = self.shards[shard_idx].lock();
                if let Some(notify) = shard.in_flight.remove(&fingerprint) {
                    notify.notify_waiters();
                }
            }
            return result.map(|entry| CachedEntry::new(entry, Arc::clone(&self.shared)));
        }
    }

    async fn compile_and_insert(&self, shard_idx: usize, fingerprint: &Fingerprint) -> Result<Arc<Entry<E>>> {
        if let Err(err) = self.shared.tracker.try_reserve_handle() {
            self.shared.counters.record_error_resource_exhausted();
            self.shared.sink.increment_counter(names::ERRORS_RESOURCE_EXHAUSTED_TOTAL);
            return Err(err);
        }

        let pattern = fingerprint.pattern().to_string();
        let case_sensitive = fingerprint.case_sensitive();
        let engine = Arc::clone(&self.shared.engine);
        let start = self.shared.clock.now_nanos();
        let compile_outcome =
            tokio::task::spawn_blocking(move || engine.compile(&pattern, case_sensitive)).await;
        let elapsed = self.shared.clock.now_nanos().saturating_sub(start);

        let handle = match compile_outcome {
            Ok(Ok(handle)) => handle,
            Ok(Err(err)) => {
                self.shared.tracker.release_handle();
                self.shared.counters.record_error_compilation_failed();
                self.shared.sink.increment_counter(names::ERRORS_COMPILATION_FAILED_TOTAL);
                return Err(err);
            }
            Err(join_err) => {
                self.shared.tracker.release_handle();
                self.shared.counters.record_error_native_library();
                self.shared.sink.increment_counter(names::ERRORS_NATIVE_LIBRARY_TOTAL);
                return Err(Error::EngineFault(format!("compile task panicked: {join_err}")));
            }
        };

        self.shared
            .sink
            .record_latency(names::PATTERNS_COMPILATION_LATENCY, Duration::from_nanos(elapsed));

        let byte_cost = self.shared.engine.memory_bytes(&handle);
        let entry = Arc::new(Entry::new(
            fingerprint.clone(),
            handle,
            byte_cost,
            self.shared.clock.now_nanos(),
        ));

        {
            let mut shard = self.shards[shard_idx].lock();
            shard.index.insert(fingerprint.clone(), Arc::clone(&entry));
        }

        let new_len = self.len.fetch_add(1, Ordering::Relaxed) + 1;
        self.shared.counters.record_compile();
        self.shared.counters.record_miss();
        self.shared.counters.add_native_memory_bytes(byte_cost);
        self.shared.sink.increment_counter(names::PATTERNS_COMPILED_TOTAL);
        self.shared.sink.increment_counter(names::CACHE_MISSES_TOTAL);

        if new_len > self.config.max_entries() {
            self.lru_notify.notify_one();
        }

        Ok(entry)
    }

    /// Compile without ever touching the index, the resource tracker, or
    /// eviction accounting. The caller owns the returned handle and is
    /// responsible for eventually calling [`Self::release_uncached`].
    pub async fn compile_uncached(&self, fingerprint: &Fingerprint) -> Result<CachedEntry<E, C, S>> {
        if fingerprint.pattern().is_empty() {
            self.shared.counters.record_error_compilation_failed();
            return Err(Error::CompilationFailed {
                pattern: String::new(),
                message: "empty pattern is not a valid regular expression".to_string(),
            });
        }

        let pattern = fingerprint.pattern().to_string();
        let case_sensitive = fingerprint.case_sensitive();
        let engine = Arc::clone(&self.shared.engine);
        let start = self.shared.clock.now_nanos();
        let compile_outcome =
            tokio::task::spawn_blocking(move || engine.compile(&pattern, case_sensitive)).await;
        let elapsed = self.shared.clock.now_nanos().saturating_sub(start);

        let handle = match compile_outcome {
            Ok(Ok(handle)) => handle,
            Ok(Err(err)) => {
                self.shared.counters.record_error_compilation_failed();
                self.shared.sink.increment_counter(names::ERRORS_COMPILATION_FAILED_TOTAL);
                return Err(err);
            }
            Err(join_err) => {
                self.shared.counters.record_error_native_library();
                return Err(Error::EngineFault(format!("compile task panicked: {join_err}")));
            }
        };

        self.shared
            .sink
            .record_latency(names::PATTERNS_COMPILATION_LATENCY, Duration::from_nanos(elapsed));

        let byte_cost = self.shared.engine.memory_bytes(&handle);
        let entry = Arc::new(Entry::new(
            fingerprint.clone(),
            handle,
            byte_cost,
            self.shared.clock.now_nanos(),
        ));
        self.shared.counters.record_compile();
        self.shared.sink.increment_counter(names::PATTERNS_COMPILED_TOTAL);

        Ok(CachedEntry::new(entry, Arc::clone(&self.shared)))
    }

    /// Release an uncached entry's handle directly. Returns
    /// [`Error::InvalidState`] if the entry's handle was already
    /// released — a caller calling this twice for the same entry is a
    /// genuine misuse of the handle's lifecycle, unlike the internal
    /// eviction/deferred-sweep races over the same flag, which tolerate
    /// losing the race by design.
    pub fn release_uncached(&self, entry: &Entry<E>) -> Result<()> {
        if entry.release_handle(&self.shared.engine) {
            Ok(())
        } else {
            Err(Error::InvalidState(
                "release_uncached called more than once for the same entry".to_string(),
            ))
        }
    }

    /// Defensive validity check: the entry is still in the index (not
    /// evicted) and the engine still considers its handle valid.
    pub fn is_valid(&self, entry: &Entry<E>) -> bool {
        !entry.is_evicted() && self.shared.engine.is_ok(entry.handle())
    }

    fn evict_entry(&self, shard_idx: usize, fingerprint: &Fingerprint, kind: EvictionKind) {
        let removed = {
            let mut shard = self.shards[shard_idx].lock();
            shard.index.remove(fingerprint)
        };
        if let Some(entry) = removed {
            self.finalize_eviction(entry, kind);
        }
    }

    fn finalize_eviction(&self, entry: Arc<Entry<E>>, kind: EvictionKind) {
        entry.mark_evicted();
        self.len.fetch_sub(1, Ordering::Relaxed);
        self.shared.counters.sub_native_memory_bytes(entry.byte_cost());

        match kind {
            EvictionKind::Lru => {
                self.shared.counters.record_eviction_lru();
                self.shared.sink.increment_counter(names::EVICTIONS_LRU_TOTAL);
            }
            EvictionKind::Idle => {
                self.shared.counters.record_eviction_idle();
                self.shared.sink.increment_counter(names::EVICTIONS_IDLE_TOTAL);
            }
            EvictionKind::Invalid | EvictionKind::Clear => {}
        }

        if entry.ref_count() == 0 {
            if entry.release_handle(&self.shared.engine) {
                self.shared.tracker.release_handle();
                self.shared.counters.record_patterns_freed();
                self.shared.sink.increment_counter(names::RESOURCES_PATTERNS_FREED_TOTAL);
            }
        } else {
            self.deferred.push(entry, &self.shared.counters);
        }
    }

    fn sweep_idle(&self) {
        let now = self.shared.clock.now_nanos();
        let idle_ttl = self.config.idle_ttl().as_nanos() as u64;
        for shard_idx in 0..self.shards.len() {
            let expired: Vec<Fingerprint> = {
                let shard = self.shards[shard_idx].lock();
                shard
                    .index
                    .iter()
                    .filter(|(_, entry)| entry.idle_nanos(now) > idle_ttl)
                    .map(|(fingerprint, _)| fingerprint.clone())
                    .collect()
            };
            for fingerprint in expired {
                self.evict_entry(shard_idx, &fingerprint, EvictionKind::Idle);
            }
        }
        debug!(target: "regexcache_core::cache", "idle sweep complete");
    }

    fn trim_lru(&self) {
        let sample_size = self.config.lru_sample_size();
        let max_entries = self.config.max_entries();
        let protection = self.config.eviction_protection().as_nanos() as u64;

        loop {
            if self.len.load(Ordering::Relaxed) <= max_entries {
                break;
            }

            let now = self.shared.clock.now_nanos();
            let mut candidate: Option<(usize, Fingerprint)> = None;
            let mut oldest_access = u64::MAX;
            let mut sampled = 0usize;

            let start_shard = if self.shards.len() > 1 {
                rand::thread_rng().gen_range(0..self.shards.len())
            } else {
                0
            };

            'scan: for offset in 0..self.shards.len() {
                let shard_idx = (start_shard + offset) % self.shards.len();
                let shard = self.shards[shard_idx].lock();
                for (fingerprint, entry) in shard.index.iter() {
                    if sampled >= sample_size {
                        break 'scan;
                    }
                    sampled += 1;
                    if entry.age_nanos(now) < protection {
                        continue;
                    }
                    let last_access = entry.last_access_nanos();
                    if last_access < oldest_access {
                        oldest_access = last_access;
                        candidate = Some((shard_idx, fingerprint.clone()));
                    }
                }
            }

            match candidate {
                Some((shard_idx, fingerprint)) => {
                    self.evict_entry(shard_idx, &fingerprint, EvictionKind::Lru);
                }
                None => {
                    warn!(
                        target: "regexcache_core::cache",
                        sampled,
                        "LRU trim found no eligible candidate this cycle; index remains over max_entries"
                    );
                    break;
                }
            }
        }
    }

    fn sweep_deferred(&self) {
        let released = self.deferred.sweep(&self.shared.engine, &self.shared.tracker, &self.shared.counters);
        if released > 0 {
            self.shared.counters.record_eviction_deferred();
            self.shared.sink.increment_counter(names::EVICTIONS_DEFERRED_TOTAL);
            for _ in 1..released {
                self.shared.counters.record_eviction_deferred();
                self.shared.sink.increment_counter(names::EVICTIONS_DEFERRED_TOTAL);
            }
        }
    }

    /// Two-pass clear: remove and release-or-defer every entry in the
    /// index, then run the deferred sweeper once. Peak gauges are not
    /// reset.
    pub fn clear(&self) {
        for shard_idx in 0..self.shards.len() {
            let drained: Vec<Arc<Entry<E>>> = {
                let mut shard = self.shards[shard_idx].lock();
                shard.index.drain().map(|(_, entry)| entry).collect()
            };
            for entry in drained {
                self.finalize_eviction(entry, EvictionKind::Clear);
            }
        }
        self.sweep_deferred();
    }

    /// Clear, then reset every cumulative counter and peak gauge back to
    /// zero. Test-only: production callers have no use for discarding
    /// history.
    pub fn reset(&self) {
        self.clear();
        self.shared.counters.reset_all();
    }

    /// Number of entries currently reachable through the main index.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Whether the main index is currently empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A consistent, lock-free snapshot of every published counter and
    /// gauge.
    pub fn statistics(&self) -> Statistics {
        self.shared.counters.snapshot(
            self.len(),
            self.shared.tracker.active_handles(),
            self.shared.tracker.active_matchers(),
        )
    }
}

#[cfg(test)]
mod tests {
    use regexcache_common::clock::TestClock;
    use regexcache_common::metrics::NoopMetricsSink;
    use regexcache_engine::regex_lite::RegexLiteEngine;

    use super::*;

    fn spawn_test_cache(config: PatternCacheConfig) -> (Arc<PatternCache<RegexLiteEngine, TestClock, NoopMetricsSink>>, TestClock) {
        let clock = TestClock::default();
        let cache = PatternCache::spawn(RegexLiteEngine::new(), clock.clone(), NoopMetricsSink, config);
        (cache, clock)
    }

    #[test_log::test(tokio::test)]
    async fn hit_after_miss() {
        let (cache, _clock) = spawn_test_cache(PatternCacheConfig::default());
        let first = cache.get_or_compile(Fingerprint::new(r"\d+", true)).await.unwrap();
        drop(first);
        let _second = cache.get_or_compile(Fingerprint::new(r"\d+", true)).await.unwrap();
        let stats = cache.statistics();
        assert_eq!(stats.cache_misses_total, 1);
        assert_eq!(stats.cache_hits_total, 1);
        assert_eq!(stats.cache_patterns_current, 1);
    }

    #[test_log::test(tokio::test)]
    async fn case_discrimination_produces_two_entries() {
        let (cache, _clock) = spawn_test_cache(PatternCacheConfig::default());
        let _a = cache.get_or_compile(Fingerprint::new("abc", true)).await.unwrap();
        let _b = cache.get_or_compile(Fingerprint::new("abc", false)).await.unwrap();
        let stats = cache.statistics();
        assert_eq!(stats.cache_misses_total, 2);
        assert_eq!(stats.cache_patterns_current, 2);
    }

    #[test_log::test(tokio::test)]
    async fn empty_pattern_is_rejected_without_touching_the_index() {
        let (cache, _clock) = spawn_test_cache(PatternCacheConfig::default());
        let err = cache.get_or_compile(Fingerprint::new("", true)).await.unwrap_err();
        assert!(matches!(err, Error::CompilationFailed { .. }));
        assert_eq!(cache.len(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn compile_uncached_never_touches_the_index() {
        let (cache, _clock) = spawn_test_cache(PatternCacheConfig::default());
        let entry = cache.compile_uncached(&Fingerprint::new("abc", true)).await.unwrap();
        assert_eq!(cache.len(), 0);
        let stats = cache.statistics();
        assert_eq!(stats.cache_hits_total, 0);
        assert_eq!(stats.cache_misses_total, 0);
        cache.release_uncached(entry.as_entry()).unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn releasing_an_uncached_entry_twice_is_an_invalid_state() {
        let (cache, _clock) = spawn_test_cache(PatternCacheConfig::default());
        let entry = cache.compile_uncached(&Fingerprint::new("abc", true)).await.unwrap();
        cache.release_uncached(entry.as_entry()).unwrap();
        let err = cache.release_uncached(entry.as_entry()).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[test_log::test(tokio::test)]
    async fn eviction_is_deferred_while_a_reference_is_held() {
        let config = PatternCacheConfig::builder()
            .max_entries(1)
            .shards(1)
            .eviction_protection(Duration::from_secs(0))
            .build();
        let (cache, clock) = spawn_test_cache(config);

        let first = cache.get_or_compile(Fingerprint::new("p1", true)).await.unwrap();
        let matcher = first.matcher(4).unwrap();

        clock.advance(1);
        let _second = cache.get_or_compile(Fingerprint::new("p2", true)).await.unwrap();
        cache.trim_lru();

        let stats = cache.statistics();
        assert_eq!(stats.evictions_lru_total, 1);
        assert_eq!(cache.len(), 1);

        drop(matcher);
        cache.sweep_deferred();
        let stats = cache.statistics();
        assert_eq!(stats.evictions_deferred_total, 1);
    }

    #[test_log::test(tokio::test)]
    async fn clear_releases_everything_not_referenced() {
        let (cache, _clock) = spawn_test_cache(PatternCacheConfig::default());
        let entry = cache.get_or_compile(Fingerprint::new("p", true)).await.unwrap();
        drop(entry);
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.statistics().resources_patterns_active_current, 0);
    }
}
