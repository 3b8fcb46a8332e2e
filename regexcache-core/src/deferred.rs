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

//! The holding area for evicted entries whose handles cannot yet be
//! released because active match executors still reference them.
//!
//! Concurrent producers (the LRU/idle sweepers and `clear`) push evicted
//! entries in here; one consumer (the deferred sweeper) periodically
//! drains whatever has reached `ref_count == 0`. A plain mutex-guarded
//! `Vec` is enough — the queue is only ever walked off the request path,
//! at `deferred_cleanup_period` cadence, so there is no hot-path cost to
//! protect against.

use std::sync::Arc;

use parking_lot::Mutex;
use regexcache_engine::Engine;

use crate::entry::Entry;
use crate::resource_tracker::ResourceTracker;
use crate::stats::LiveCounters;

/// Queue of entries pending release, plus the accounting tied to
/// membership in it (`deferred_memory_bytes`, `deferred_patterns_current`).
pub struct DeferredQueue<E: Engine> {
    entries: Mutex<Vec<Arc<Entry<E>>>>,
}

impl<E: Engine> Default for DeferredQueue<E> {
    fn default() -> Self {
        Self { entries: Mutex::new(Vec::new()) }
    }
}

impl<E: Engine> DeferredQueue<E> {
    /// Push a newly evicted entry. `entry.mark_evicted()` must already
    /// have been called by the caller before this.
    pub fn push(&self, entry: Arc<Entry<E>>, counters: &LiveCounters) {
        let mut guard = self.entries.lock();
        guard.push(entry);
        counters.set_deferred_patterns_current(guard.len());
        let bytes: usize = guard.iter().map(|entry| entry.byte_cost()).sum();
        counters.set_deferred_native_memory_current(bytes);
    }

    /// Current number of entries pending release.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Sum of `byte_cost` across everything currently queued.
    pub fn memory_bytes(&self) -> usize {
        self.entries.lock().iter().map(|entry| entry.byte_cost()).sum()
    }

    /// Drain every entry whose `ref_count` has reached zero, release its
    /// handle through `engine`, and update accounting. Returns the
    /// number of entries released — the caller increments
    /// `cache.evictions.deferred.total.count` by this amount.
    pub fn sweep(&self, engine: &E, tracker: &ResourceTracker, counters: &LiveCounters) -> usize {
        let mut released = 0usize;
        let mut guard = self.entries.lock();
        guard.retain(|entry| {
            if entry.ref_count() == 0 {
                if entry.release_handle(engine) {
                    tracker.release_handle();
                    counters.record_patterns_freed();
                    released += 1;
                }
                false
            } else {
                true
            }
        });
        let remaining = guard.len();
        let remaining_bytes: usize = guard.iter().map(|entry| entry.byte_cost()).sum();
        drop(guard);
        counters.set_deferred_patterns_current(remaining);
        counters.set_deferred_native_memory_current(remaining_bytes);
        released
    }
}
