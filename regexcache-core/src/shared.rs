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

//! The bundle of collaborators a [`crate::entry::CachedEntry`] and a
//! [`crate::matcher::MatchExecutor`] need to outlive a borrow of the
//! [`crate::cache::PatternCache`] that produced them — each one holds a
//! cheap `Arc` clone of this instead of the whole cache (shards, index,
//! deferred queue).

use std::sync::Arc;

use regexcache_common::clock::Clock;
use regexcache_common::metrics::MetricsSink;
use regexcache_engine::Engine;

use crate::resource_tracker::ResourceTracker;
use crate::stats::LiveCounters;

pub(crate) struct Shared<E: Engine, C: Clock, S: MetricsSink> {
    /// `Arc`-wrapped so it can be cheaply cloned into a `spawn_blocking`
    /// closure regardless of whether the concrete engine type is itself
    /// `Clone`.
    pub(crate) engine: Arc<E>,
    pub(crate) clock: C,
    pub(crate) sink: S,
    pub(crate) tracker: ResourceTracker,
    pub(crate) counters: LiveCounters,
}
