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

//! A single injectable source of monotonic time.
//!
//! Every monotonic timestamp in the cache (`created_at_nanos`,
//! `last_access_nanos`) is taken from a [`Clock`], not directly from
//! `Instant::now()`, so idle-TTL and eviction-protection logic can be
//! driven deterministically in tests instead of sleeping.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

/// A monotonic clock. `now_nanos` must never go backwards.
pub trait Clock: Send + Sync + 'static {
    /// Nanoseconds since some arbitrary, fixed epoch specific to this
    /// clock instance. Only differences between two calls are
    /// meaningful.
    fn now_nanos(&self) -> u64;
}

/// The production clock, backed by [`std::time::Instant`].
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now_nanos(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// A manually-advanced clock for deterministic tests.
#[derive(Debug, Clone, Default)]
pub struct TestClock {
    nanos: Arc<AtomicU64>,
}

impl TestClock {
    /// Advance the clock by `nanos` and return the new reading.
    pub fn advance(&self, nanos: u64) -> u64 {
        self.nanos.fetch_add(nanos, Ordering::SeqCst) + nanos
    }
}

impl Clock for TestClock {
    fn now_nanos(&self) -> u64 {
        self.nanos.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::default();
        let a = clock.now_nanos();
        let b = clock.now_nanos();
        assert!(b >= a);
    }

    #[test_log::test]
    fn test_clock_advances_on_demand() {
        let clock = TestClock::default();
        assert_eq!(clock.now_nanos(), 0);
        assert_eq!(clock.advance(100), 100);
        assert_eq!(clock.now_nanos(), 100);
    }
}
