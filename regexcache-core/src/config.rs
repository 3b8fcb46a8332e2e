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

//! Pattern cache configuration, built through [`PatternCacheConfigBuilder`].
//!
//! There is no escape hatch for arbitrary keys: the builder only exposes
//! the setters documented here, so an unknown option can never reach
//! `build()` in the first place.

use std::time::Duration;

/// Immutable configuration for one [`crate::cache::PatternCache`] instance.
#[derive(Debug, Clone)]
pub struct PatternCacheConfig {
    pub(crate) max_entries: usize,
    pub(crate) idle_ttl: Duration,
    pub(crate) idle_scan_period: Duration,
    pub(crate) deferred_cleanup_period: Duration,
    pub(crate) max_active_handles: usize,
    pub(crate) max_matchers_per_entry: usize,
    pub(crate) validate_on_hit: bool,
    pub(crate) eviction_protection: Duration,
    pub(crate) cache_enabled: bool,
    pub(crate) shards: usize,
    pub(crate) lru_sample_size: usize,
}

impl Default for PatternCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 4096,
            idle_ttl: Duration::from_secs(10 * 60),
            idle_scan_period: Duration::from_secs(30),
            deferred_cleanup_period: Duration::from_secs(5),
            max_active_handles: 8192,
            max_matchers_per_entry: 256,
            validate_on_hit: true,
            eviction_protection: Duration::from_secs(1),
            cache_enabled: true,
            shards: 16,
            lru_sample_size: 500,
        }
    }
}

impl PatternCacheConfig {
    /// Start building a configuration from the documented defaults.
    pub fn builder() -> PatternCacheConfigBuilder {
        PatternCacheConfigBuilder::default()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub fn idle_scan_period(&self) -> Duration {
        self.idle_scan_period
    }

    pub fn deferred_cleanup_period(&self) -> Duration {
        self.deferred_cleanup_period
    }

    pub fn max_active_handles(&self) -> usize {
        self.max_active_handles
    }

    pub fn max_matchers_per_entry(&self) -> usize {
        self.max_matchers_per_entry
    }

    pub fn validate_on_hit(&self) -> bool {
        self.validate_on_hit
    }

    pub fn eviction_protection(&self) -> Duration {
        self.eviction_protection
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    pub fn shards(&self) -> usize {
        self.shards
    }

    pub fn lru_sample_size(&self) -> usize {
        self.lru_sample_size
    }
}

/// Builder for [`PatternCacheConfig`], seeded with the documented defaults.
#[derive(Debug, Clone)]
pub struct PatternCacheConfigBuilder {
    inner: PatternCacheConfig,
}

impl Default for PatternCacheConfigBuilder {
    fn default() -> Self {
        Self {
            inner: PatternCacheConfig::default(),
        }
    }
}

impl PatternCacheConfigBuilder {
    /// Maximum number of distinct compiled patterns retained at once.
    pub fn max_entries(mut self, value: usize) -> Self {
        self.inner.max_entries = value;
        self
    }

    /// How long an entry may sit unused before the idle sweeper evicts it.
    pub fn idle_ttl(mut self, value: Duration) -> Self {
        self.inner.idle_ttl = value;
        self
    }

    /// How often the idle sweeper scans for expired entries.
    pub fn idle_scan_period(mut self, value: Duration) -> Self {
        self.inner.idle_scan_period = value;
        self
    }

    /// How often the deferred-release sweeper retries draining its queue.
    pub fn deferred_cleanup_period(mut self, value: Duration) -> Self {
        self.inner.deferred_cleanup_period = value;
        self
    }

    /// Process-wide cap on distinct compiled handles.
    pub fn max_active_handles(mut self, value: usize) -> Self {
        self.inner.max_active_handles = value;
        self
    }

    /// Per-entry cap on concurrently open matching sessions.
    pub fn max_matchers_per_entry(mut self, value: usize) -> Self {
        self.inner.max_matchers_per_entry = value;
        self
    }

    /// Whether a cache hit re-validates the handle via `Engine::is_ok`
    /// before returning it.
    pub fn validate_on_hit(mut self, value: bool) -> Self {
        self.inner.validate_on_hit = value;
        self
    }

    /// Grace period after which a referenced entry becomes eligible for
    /// eviction anyway, once it would otherwise be chosen by the LRU
    /// sweep and has sat past this duration since creation.
    pub fn eviction_protection(mut self, value: Duration) -> Self {
        self.inner.eviction_protection = value;
        self
    }

    /// Master on/off switch; when `false`, every `compile` behaves like
    /// `compile_uncached`.
    pub fn cache_enabled(mut self, value: bool) -> Self {
        self.inner.cache_enabled = value;
        self
    }

    /// Number of index shards.
    pub fn shards(mut self, value: usize) -> Self {
        self.inner.shards = value;
        self
    }

    /// Sample size used by the sample-based LRU sweep.
    pub fn lru_sample_size(mut self, value: usize) -> Self {
        self.inner.lru_sample_size = value;
        self
    }

    /// Finish building. Always succeeds: every setter already constrains
    /// its field to a valid Rust value, and the builder exposes no way to
    /// set an unrecognized option.
    pub fn build(self) -> PatternCacheConfig {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn defaults_match_documented_values() {
        let config = PatternCacheConfig::default();
        assert_eq!(config.max_entries(), 4096);
        assert_eq!(config.idle_ttl(), Duration::from_secs(600));
        assert_eq!(config.idle_scan_period(), Duration::from_secs(30));
        assert_eq!(config.deferred_cleanup_period(), Duration::from_secs(5));
        assert_eq!(config.max_active_handles(), 8192);
        assert_eq!(config.max_matchers_per_entry(), 256);
        assert!(config.validate_on_hit());
        assert_eq!(config.eviction_protection(), Duration::from_secs(1));
        assert!(config.cache_enabled());
        assert_eq!(config.shards(), 16);
        assert_eq!(config.lru_sample_size(), 500);
    }

    #[test_log::test]
    fn builder_overrides_only_requested_fields() {
        let config = PatternCacheConfig::builder().max_entries(10).shards(4).build();
        assert_eq!(config.max_entries(), 10);
        assert_eq!(config.shards(), 4);
        assert_eq!(config.max_active_handles(), 8192);
    }
}
