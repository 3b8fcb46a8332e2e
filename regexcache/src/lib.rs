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

//! Public façade over the pattern cache: two compilation modes, one
//! matching convenience, and a small set of administration operations.
//!
//! [`Cache`] is independently instantiable and injectable — every
//! observable behavior is reachable through an explicit instance, so
//! nothing here requires the process-wide [`default_cache`] convenience.
//! The free functions ([`compile`], [`compile_uncached`], [`matches`],
//! [`statistics`], [`clear`], [`reset`]) exist purely for call-site
//! ergonomics and forward to that shared instance.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

pub use regexcache_common::clock::MonotonicClock;
pub use regexcache_common::error::{Error, Result};
pub use regexcache_common::metrics::{MetricsSink, NoopMetricsSink, TracingMetricsSink};
pub use regexcache_core::{
    CachedEntry, Entry, Fingerprint, MatchExecutor, PatternCacheConfig, PatternCacheConfigBuilder,
    Statistics,
};
use regexcache_core::PatternCache;
pub use regexcache_engine::regex_lite::RegexLiteEngine;
pub use regexcache_engine::Engine;

/// The engine this façade is wired to. Swappable only by depending on
/// `regexcache-core` directly and assembling a `PatternCache` over a
/// different [`Engine`] implementation.
type DefaultEngine = RegexLiteEngine;
/// A dynamically-dispatched sink, so [`Cache`] can be configured with
/// any [`MetricsSink`] implementation at construction without becoming
/// generic over it itself.
type DynSink = Arc<dyn MetricsSink>;

/// A cached, retrieved, or uncached compiled pattern handle.
pub type Handle = CachedEntry<DefaultEngine, MonotonicClock, DynSink>;
/// A matching session opened against a [`Handle`].
pub type Matcher = MatchExecutor<DefaultEngine, MonotonicClock, DynSink>;

/// An instantiable, independently configurable pattern cache.
///
/// Wraps an `Arc`-swappable [`PatternCache`] so [`Cache::reconfigure`]
/// can atomically replace the whole cache (test-only, per the
/// coordination layer's design) while in-flight [`Handle`]s and
/// [`Matcher`]s keep working against whichever cache produced them —
/// each one carries its own reference to its collaborators, independent
/// of this wrapper.
pub struct Cache {
    inner: RwLock<Arc<PatternCache<DefaultEngine, MonotonicClock, DynSink>>>,
}

impl Cache {
    /// Build a cache with the given configuration and the no-op metrics
    /// sink.
    pub fn new(config: PatternCacheConfig) -> Self {
        Self::with_metrics_sink(config, Arc::new(NoopMetricsSink))
    }

    /// Build a cache publishing to `sink`.
    pub fn with_metrics_sink(config: PatternCacheConfig, sink: DynSink) -> Self {
        let cache = PatternCache::spawn(DefaultEngine::new(), MonotonicClock::default(), sink, config);
        Self { inner: RwLock::new(cache) }
    }

    fn current(&self) -> Arc<PatternCache<DefaultEngine, MonotonicClock, DynSink>> {
        Arc::clone(&self.inner.read())
    }

    /// Compile `text`, or return the cached handle for an identical
    /// prior compile. `case_sensitive` defaults to `true` at the
    /// call-site convenience functions; this method always requires it
    /// explicitly.
    pub async fn compile(&self, text: &str, case_sensitive: bool) -> Result<Handle> {
        self.current().get_or_compile(Fingerprint::new(text, case_sensitive)).await
    }

    /// Compile `text` without touching the cache's index or accounting.
    /// The returned handle must eventually be passed to
    /// [`Cache::release_uncached`].
    pub async fn compile_uncached(&self, text: &str, case_sensitive: bool) -> Result<Handle> {
        self.current()
            .compile_uncached(&Fingerprint::new(text, case_sensitive))
            .await
    }

    /// Release a handle obtained from [`Cache::compile_uncached`].
    pub fn release_uncached(&self, entry: &Handle) -> Result<()> {
        self.current().release_uncached(entry.as_entry())
    }

    /// Convenience: compile (or hit) `text`, then test `input` for a
    /// match anywhere within it. Equivalent to `compile(text,
    /// case_sensitive)` followed by opening a matcher and calling
    /// `partial_match`.
    pub async fn matches(&self, text: &str, case_sensitive: bool, input: &[u8]) -> Result<bool> {
        let handle = self.compile(text, case_sensitive).await?;
        let matcher = handle.into_matcher();
        matcher.partial_match(input)
    }

    /// A consistent, lock-free snapshot of the cache's counters and
    /// gauges.
    pub fn statistics(&self) -> Statistics {
        self.current().statistics()
    }

    /// Evict and release (or defer) every entry currently in the index.
    pub fn clear(&self) {
        tracing::debug!(target: "regexcache::facade", "clearing cache");
        self.current().clear();
    }

    /// Clear, then reset every cumulative counter and peak gauge.
    /// Test-only.
    pub fn reset(&self) {
        tracing::debug!(target: "regexcache::facade", "resetting cache counters");
        self.current().reset();
    }

    /// Atomically replace this cache's configuration by constructing a
    /// fresh [`PatternCache`], clearing the old one, and re-pointing
    /// this wrapper at the replacement. Test-only: in-flight handles and
    /// matchers against the old cache continue to work, since each one
    /// owns its own reference to its collaborators independent of this
    /// wrapper.
    pub fn reconfigure(&self, config: PatternCacheConfig) {
        tracing::info!(target: "regexcache::facade", "reconfiguring cache, discarding old instance");
        let mut guard = self.inner.write();
        let sink: DynSink = Arc::new(NoopMetricsSink);
        let replacement = PatternCache::spawn(DefaultEngine::new(), MonotonicClock::default(), sink, config);
        let old = std::mem::replace(&mut *guard, replacement);
        drop(guard);
        old.clear();
    }

    /// Defensive: is this handle still reachable through the index and
    /// does the engine still consider it valid?
    pub fn is_valid(&self, entry: &Handle) -> bool {
        self.current().is_valid(entry.as_entry())
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(PatternCacheConfig::default())
    }
}

static DEFAULT_CACHE: OnceLock<Cache> = OnceLock::new();

/// The process-wide default cache, built lazily on first use with
/// [`PatternCacheConfig::default`]. A convenience only — every operation
/// it exposes is also reachable through an explicitly constructed
/// [`Cache`].
pub fn default_cache() -> &'static Cache {
    DEFAULT_CACHE.get_or_init(Cache::default)
}

/// Compile `text` against the process-wide default cache.
pub async fn compile(text: &str, case_sensitive: bool) -> Result<Handle> {
    default_cache().compile(text, case_sensitive).await
}

/// Compile `text` uncached against the process-wide default cache.
pub async fn compile_uncached(text: &str, case_sensitive: bool) -> Result<Handle> {
    default_cache().compile_uncached(text, case_sensitive).await
}

/// Test `input` against `text` using the process-wide default cache.
pub async fn matches(text: &str, case_sensitive: bool, input: &[u8]) -> Result<bool> {
    default_cache().matches(text, case_sensitive, input).await
}

/// A snapshot of the process-wide default cache's statistics.
pub fn statistics() -> Statistics {
    default_cache().statistics()
}

/// Clear the process-wide default cache.
pub fn clear() {
    default_cache().clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn compile_then_match_roundtrips() {
        let cache = Cache::new(PatternCacheConfig::default());
        assert!(cache.matches(r"\d+", true, b"abc123").await.unwrap());
        assert!(!cache.matches(r"\d+", true, b"abc").await.unwrap());
    }

    #[test_log::test(tokio::test)]
    async fn hit_after_miss_via_facade() {
        let cache = Cache::new(PatternCacheConfig::default());
        let first = cache.compile("abc", true).await.unwrap();
        drop(first);
        let _second = cache.compile("abc", true).await.unwrap();
        let stats = cache.statistics();
        assert_eq!(stats.cache_misses_total, 1);
        assert_eq!(stats.cache_hits_total, 1);
    }

    #[test_log::test(tokio::test)]
    async fn reconfigure_swaps_live_cache_without_breaking_open_handles() {
        let cache = Cache::new(PatternCacheConfig::builder().max_entries(10).build());
        let handle = cache.compile("abc", true).await.unwrap();
        cache.reconfigure(PatternCacheConfig::builder().max_entries(1).build());
        assert_eq!(cache.statistics().cache_patterns_current, 0);
        // The handle compiled against the old cache still works.
        assert!(handle.into_matcher().partial_match(b"abc").unwrap());
    }

    #[test_log::test(tokio::test)]
    async fn default_cache_is_reachable_via_free_functions() {
        clear();
        let before = statistics().patterns_compiled_total;
        compile("xyz", true).await.unwrap();
        assert_eq!(statistics().patterns_compiled_total, before + 1);
    }
}
