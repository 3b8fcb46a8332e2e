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

//! A short-lived matching session bound to one entry.
//!
//! Single-threaded by convention: nothing here is `!Send`, but running
//! one `MatchExecutor`'s operations concurrently from multiple threads
//! would race its own latency bookkeeping, so callers must not share one
//! across workers. The underlying entry itself may be shared freely —
//! the engine's match operations are contract-thread-safe for read-only
//! use on distinct `MatchExecutor`s over the same handle.

use std::sync::Arc;
use std::time::Duration;

use regexcache_common::clock::Clock;
use regexcache_common::metrics::{names, MetricsSink};
use regexcache_common::Result;
use regexcache_engine::Engine;

use crate::entry::Entry;
use crate::shared::Shared;

/// One matching session against a single cached or uncached entry.
pub struct MatchExecutor<E: Engine, C: Clock, S: MetricsSink> {
    entry: Arc<Entry<E>>,
    shared: Arc<Shared<E, C, S>>,
}

impl<E: Engine, C: Clock, S: MetricsSink> MatchExecutor<E, C, S> {
    pub(crate) fn new(entry: Arc<Entry<E>>, shared: Arc<Shared<E, C, S>>) -> Self {
        Self { entry, shared }
    }

    /// Does the haystack match over its entire length?
    pub fn full_match(&self, haystack: &[u8]) -> Result<bool> {
        let start = self.shared.clock.now_nanos();
        let result = self.shared.engine.full_match(self.entry.handle(), haystack);
        let elapsed = self.shared.clock.now_nanos().saturating_sub(start);
        self.shared.sink.record_latency(names::MATCHING_FULL_MATCH_LATENCY, Duration::from_nanos(elapsed));
        self.shared.counters.record_matching_operation();
        self.shared.sink.increment_counter(names::MATCHING_OPERATIONS_TOTAL);
        result
    }

    /// Does the haystack contain a match anywhere?
    pub fn partial_match(&self, haystack: &[u8]) -> Result<bool> {
        let start = self.shared.clock.now_nanos();
        let result = self.shared.engine.partial_match(self.entry.handle(), haystack);
        let elapsed = self.shared.clock.now_nanos().saturating_sub(start);
        self.shared
            .sink
            .record_latency(names::MATCHING_PARTIAL_MATCH_LATENCY, Duration::from_nanos(elapsed));
        self.shared.counters.record_matching_operation();
        self.shared.sink.increment_counter(names::MATCHING_OPERATIONS_TOTAL);
        result
    }
}

impl<E: Engine, C: Clock, S: MetricsSink> Drop for MatchExecutor<E, C, S> {
    fn drop(&mut self) {
        self.entry.release_ref();
        self.shared.tracker.matcher_closed();
        self.shared.counters.record_matchers_freed();
        self.shared.sink.increment_counter(names::RESOURCES_MATCHERS_FREED_TOTAL);
    }
}

#[cfg(test)]
mod tests {
    use regexcache_common::clock::TestClock;
    use regexcache_common::metrics::NoopMetricsSink;
    use regexcache_engine::regex_lite::RegexLiteEngine;

    use super::*;
    use crate::fingerprint::Fingerprint;
    use crate::resource_tracker::ResourceTracker;
    use crate::stats::LiveCounters;

    fn make_executor(pattern: &str) -> MatchExecutor<RegexLiteEngine, TestClock, NoopMetricsSink> {
        let engine = RegexLiteEngine::new();
        let handle = engine.compile(pattern, true).unwrap();
        let entry = Arc::new(Entry::new(Fingerprint::new(pattern, true), handle, 64, 0));
        let shared = Arc::new(Shared {
            engine: Arc::new(engine),
            clock: TestClock::default(),
            sink: NoopMetricsSink,
            tracker: ResourceTracker::new(10),
            counters: LiveCounters::default(),
        });
        shared.tracker.matcher_opened();
        MatchExecutor::new(entry, shared)
    }

    #[test_log::test]
    fn full_match_requires_entire_haystack() {
        let executor = make_executor(r"\d+");
        assert!(executor.full_match(b"123").unwrap());
        assert!(!executor.full_match(b"abc123").unwrap());
    }

    #[test_log::test]
    fn partial_match_finds_anywhere() {
        let executor = make_executor(r"\d+");
        assert!(executor.partial_match(b"abc123").unwrap());
    }

    #[test_log::test]
    fn drop_releases_reference_and_matcher_slot() {
        let executor = make_executor("a");
        let entry = Arc::clone(&executor.entry);
        let tracker_handle = Arc::clone(&executor.shared);
        assert_eq!(entry.ref_count(), 1);
        assert_eq!(tracker_handle.tracker.active_matchers(), 1);
        drop(executor);
        assert_eq!(entry.ref_count(), 0);
        assert_eq!(tracker_handle.tracker.active_matchers(), 0);
    }
}
