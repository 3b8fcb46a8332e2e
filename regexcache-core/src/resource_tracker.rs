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

//! Process-wide resource accounting: two atomic counters, one enforced
//! soft cap.
//!
//! `active_handles` is enforced against `max_active_handles` at every
//! compile. `active_matchers` is observability-only — there is no
//! process-wide matcher cap in the configuration surface, only the
//! per-entry `max_matchers_per_entry` enforced on [`crate::entry::Entry`]
//! directly — so this tracker only exposes it as a gauge.

use std::sync::atomic::{AtomicUsize, Ordering};

use regexcache_common::error::{Error, ResourceKind};
use regexcache_common::Result;

/// Tracks process-wide active-handle and active-matcher counts.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    active_handles: AtomicUsize,
    active_matchers: AtomicUsize,
    max_active_handles: usize,
}

impl ResourceTracker {
    /// Construct a tracker enforcing `max_active_handles`.
    pub fn new(max_active_handles: usize) -> Self {
        Self {
            active_handles: AtomicUsize::new(0),
            active_matchers: AtomicUsize::new(0),
            max_active_handles,
        }
    }

    /// Current number of distinct compiled handles held by the cache.
    pub fn active_handles(&self) -> usize {
        self.active_handles.load(Ordering::Acquire)
    }

    /// Current number of open matching sessions, across all entries.
    /// Observability only — never enforced.
    pub fn active_matchers(&self) -> usize {
        self.active_matchers.load(Ordering::Acquire)
    }

    /// Reserve one handle slot, iff doing so would not exceed
    /// `max_active_handles`. Called once per compile that adds a new
    /// cached entry; `compile_uncached` never calls this, since a
    /// bypassed compile never touches the cache or its accounting.
    pub fn try_reserve_handle(&self) -> Result<()> {
        let mut current = self.active_handles.load(Ordering::Acquire);
        loop {
            if current >= self.max_active_handles {
                return Err(Error::ResourceExhausted {
                    kind: ResourceKind::ActiveHandles,
                });
            }
            match self.active_handles.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(observed) => current = observed,
            }
        }
    }

    /// Release one handle slot, e.g. after an entry has been fully
    /// evicted and its handle released.
    pub fn release_handle(&self) {
        let previous = self.active_handles.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "handle slot released past zero");
    }

    /// Record the start of a new matching session.
    pub fn matcher_opened(&self) {
        self.active_matchers.fetch_add(1, Ordering::AcqRel);
    }

    /// Record the end of a matching session.
    pub fn matcher_closed(&self) {
        let previous = self.active_matchers.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "matcher slot closed past zero");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn reserves_up_to_the_cap() {
        let tracker = ResourceTracker::new(2);
        tracker.try_reserve_handle().unwrap();
        tracker.try_reserve_handle().unwrap();
        let err = tracker.try_reserve_handle().unwrap_err();
        assert!(matches!(err, Error::ResourceExhausted { .. }));
        assert_eq!(tracker.active_handles(), 2);
    }

    #[test_log::test]
    fn release_frees_a_slot_for_reuse() {
        let tracker = ResourceTracker::new(1);
        tracker.try_reserve_handle().unwrap();
        assert!(tracker.try_reserve_handle().is_err());
        tracker.release_handle();
        tracker.try_reserve_handle().unwrap();
        assert_eq!(tracker.active_handles(), 1);
    }

    #[test_log::test]
    fn active_matchers_is_observability_only() {
        let tracker = ResourceTracker::new(1);
        for _ in 0..1000 {
            tracker.matcher_opened();
        }
        assert_eq!(tracker.active_matchers(), 1000);
    }
}
