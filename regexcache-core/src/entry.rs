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

//! The cached-entry record: one compiled handle plus its accounting.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use regexcache_common::clock::Clock;
use regexcache_common::error::{Error, ResourceKind};
use regexcache_common::metrics::MetricsSink;
use regexcache_common::Result;
use regexcache_engine::Engine;

use crate::fingerprint::Fingerprint;
use crate::matcher::MatchExecutor;
use crate::shared::Shared;

/// One compiled handle and its accounting fields.
///
/// Mutated only through atomic operations on `last_access_nanos`,
/// `ref_count`, and `evicted` — no lock is ever taken on an entry itself
/// on the hot path. `handle` and `byte_cost` are set once at
/// construction and never change afterward.
pub struct Entry<E: Engine> {
    fingerprint: Fingerprint,
    handle: E::Handle,
    byte_cost: usize,
    created_at_nanos: u64,
    last_access_nanos: AtomicU64,
    ref_count: AtomicUsize,
    evicted: AtomicBool,
    released: AtomicBool,
}

impl<E: Engine> Entry<E> {
    /// Construct a new entry with `ref_count == 1`, representing the
    /// single reference returned to the winner of a single-flight
    /// compile.
    pub fn new(fingerprint: Fingerprint, handle: E::Handle, byte_cost: usize, now_nanos: u64) -> Self {
        Self {
            fingerprint,
            handle,
            byte_cost,
            created_at_nanos: now_nanos,
            last_access_nanos: AtomicU64::new(now_nanos),
            ref_count: AtomicUsize::new(1),
            evicted: AtomicBool::new(false),
            released: AtomicBool::new(false),
        }
    }

    /// The key this entry is filed under.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Borrow the engine handle. Valid for as long as the entry is not
    /// released — which, by construction, is guaranteed for as long as
    /// any `CachedEntry`/`MatchExecutor` referencing this entry is alive.
    pub fn handle(&self) -> &E::Handle {
        &self.handle
    }

    /// The engine-reported memory footprint captured at creation.
    pub fn byte_cost(&self) -> usize {
        self.byte_cost
    }

    /// Monotonic creation timestamp.
    pub fn created_at_nanos(&self) -> u64 {
        self.created_at_nanos
    }

    /// Monotonic last-access timestamp, most recently bumped by `touch`.
    pub fn last_access_nanos(&self) -> u64 {
        self.last_access_nanos.load(Ordering::Acquire)
    }

    /// Age since creation, given the current time.
    pub fn age_nanos(&self, now_nanos: u64) -> u64 {
        now_nanos.saturating_sub(self.created_at_nanos)
    }

    /// Idle time since last access, given the current time.
    pub fn idle_nanos(&self, now_nanos: u64) -> u64 {
        now_nanos.saturating_sub(self.last_access_nanos())
    }

    /// Bump `last_access_nanos` to `now_nanos`, monotonically (a CAS-max:
    /// concurrent touches never move the timestamp backwards).
    pub fn touch(&self, now_nanos: u64) {
        let mut current = self.last_access_nanos.load(Ordering::Acquire);
        while now_nanos > current {
            match self.last_access_nanos.compare_exchange_weak(
                current,
                now_nanos,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }

    /// Whether this entry has been removed from the main index (LRU,
    /// idle, or explicit clear).
    pub fn is_evicted(&self) -> bool {
        self.evicted.load(Ordering::Acquire)
    }

    /// Mark this entry evicted. Idempotent.
    pub fn mark_evicted(&self) {
        self.evicted.store(true, Ordering::Release);
    }

    /// Current reference count. Zero means no active matchers and no
    /// retained `CachedEntry` handle.
    pub fn ref_count(&self) -> usize {
        self.ref_count.load(Ordering::Acquire)
    }

    /// CAS-increment the reference count iff the result would not exceed
    /// `max`. Returns [`Error::ResourceExhausted`] on cap breach, leaving
    /// the counter untouched.
    pub fn try_acquire(&self, max: usize) -> Result<()> {
        let mut current = self.ref_count.load(Ordering::Acquire);
        loop {
            if current >= max {
                return Err(Error::ResourceExhausted {
                    kind: ResourceKind::MatchersPerEntry,
                });
            }
            match self.ref_count.compare_exchange_weak(
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

    /// Decrement the reference count. Never goes negative; a release
    /// past zero indicates a bug in this crate's own bookkeeping and is
    /// only guarded by a `debug_assert` since it should be unreachable
    /// from any caller going through the public API.
    pub fn release_ref(&self) {
        let previous = self.ref_count.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "reference count released past zero");
    }

    /// Attempt to transition this entry into the terminal `Released`
    /// state by calling the engine adapter's `release`. Returns `true`
    /// exactly once, for whichever caller wins the race to flip
    /// `released` from `false` to `true` — guaranteeing invariant 1
    /// ("a handle is released exactly once") even if two sweepers
    /// observe `ref_count == 0` concurrently.
    pub fn release_handle(&self, engine: &E) -> bool {
        if self
            .released
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            engine.release(&self.handle);
            true
        } else {
            false
        }
    }
}

/// RAII handle returned by `get-or-compile`: owns exactly one unit of its
/// entry's `ref_count`, acquired at construction (either the fresh
/// `ref_count = 1` of a new compile, or a `try_acquire` on a hit) and
/// released on `Drop`.
pub struct CachedEntry<E: Engine, C: Clock, S: MetricsSink> {
    inner: Option<Arc<Entry<E>>>,
    shared: Arc<Shared<E, C, S>>,
}

impl<E: Engine, C: Clock, S: MetricsSink> CachedEntry<E, C, S> {
    pub(crate) fn new(inner: Arc<Entry<E>>, shared: Arc<Shared<E, C, S>>) -> Self {
        Self { inner: Some(inner), shared }
    }

    fn entry(&self) -> &Arc<Entry<E>> {
        self.inner.as_ref().expect("CachedEntry always holds an entry until dropped")
    }

    /// The fingerprint this handle was compiled or retrieved for.
    pub fn fingerprint(&self) -> &Fingerprint {
        self.entry().fingerprint()
    }

    /// The engine-reported memory footprint of the underlying handle.
    pub fn byte_cost(&self) -> usize {
        self.entry().byte_cost()
    }

    /// The entry's current reference count, including the unit this
    /// handle itself owns.
    pub fn ref_count(&self) -> usize {
        self.entry().ref_count()
    }

    /// Borrow the underlying entry record directly — used by
    /// `PatternCache::release_uncached` and `PatternCache::is_valid`.
    pub fn as_entry(&self) -> &Entry<E> {
        self.entry()
    }

    /// Open an additional, independent matching session against the
    /// same entry, acquiring a fresh reference checked against
    /// `max_matchers_per_entry`. Use this when more than one concurrent
    /// matcher is needed while still retaining this handle.
    pub fn matcher(&self, max_matchers_per_entry: usize) -> Result<MatchExecutor<E, C, S>> {
        self.entry().try_acquire(max_matchers_per_entry)?;
        self.shared.tracker.matcher_opened();
        Ok(MatchExecutor::new(Arc::clone(self.entry()), Arc::clone(&self.shared)))
    }

    /// Consume this handle, moving the single reference it already owns
    /// into a matching session. No new acquisition and no cap check —
    /// this is the "use the handle you already hold" path.
    pub fn into_matcher(mut self) -> MatchExecutor<E, C, S> {
        let entry = self.inner.take().expect("CachedEntry always holds an entry until dropped");
        self.shared.tracker.matcher_opened();
        MatchExecutor::new(entry, Arc::clone(&self.shared))
    }
}

impl<E: Engine, C: Clock, S: MetricsSink> Drop for CachedEntry<E, C, S> {
    fn drop(&mut self) {
        if let Some(entry) = self.inner.take() {
            entry.release_ref();
        }
    }
}

#[cfg(test)]
mod tests {
    use regexcache_engine::regex_lite::RegexLiteEngine;

    use super::*;

    fn make_entry() -> Entry<RegexLiteEngine> {
        let engine = RegexLiteEngine::new();
        let handle = engine.compile("abc", true).unwrap();
        Entry::new(Fingerprint::new("abc", true), handle, 256, 1_000)
    }

    #[test_log::test]
    fn new_entry_has_ref_count_one() {
        let entry = make_entry();
        assert_eq!(entry.ref_count(), 1);
        assert!(!entry.is_evicted());
    }

    #[test_log::test]
    fn try_acquire_respects_cap() {
        let entry = make_entry();
        entry.try_acquire(2).unwrap();
        assert_eq!(entry.ref_count(), 2);
        let err = entry.try_acquire(2).unwrap_err();
        assert!(matches!(err, Error::ResourceExhausted { .. }));
        assert_eq!(entry.ref_count(), 2);
    }

    #[test_log::test]
    fn release_ref_decrements() {
        let entry = make_entry();
        entry.try_acquire(5).unwrap();
        assert_eq!(entry.ref_count(), 2);
        entry.release_ref();
        assert_eq!(entry.ref_count(), 1);
    }

    #[test_log::test]
    fn touch_is_monotone() {
        let entry = make_entry();
        entry.touch(2_000);
        assert_eq!(entry.last_access_nanos(), 2_000);
        entry.touch(1_500);
        assert_eq!(entry.last_access_nanos(), 2_000, "touch must never move time backwards");
    }

    #[test_log::test]
    fn release_handle_is_exactly_once() {
        let entry = make_entry();
        let engine = RegexLiteEngine::new();
        assert!(entry.release_handle(&engine));
        assert!(!entry.release_handle(&engine));
    }
}
