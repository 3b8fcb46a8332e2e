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

//! The coordination layer: a concurrent, fingerprint-keyed cache of
//! compiled pattern handles sitting in front of a [`regexcache_engine::Engine`].
//!
//! [`cache::PatternCache`] is the entry point. Everything else in this
//! crate exists to support it: [`fingerprint::Fingerprint`] is its key,
//! [`entry::Entry`]/[`entry::CachedEntry`] are its value and the RAII
//! handle returned to callers, [`matcher::MatchExecutor`] is what a
//! caller opens against a retained entry, [`resource_tracker::ResourceTracker`]
//! and [`stats::LiveCounters`] back its accounting, [`deferred::DeferredQueue`]
//! holds entries that outlived their place in the index, and
//! [`config::PatternCacheConfig`] configures all of it.

pub mod cache;
pub mod config;
pub mod deferred;
pub mod entry;
pub mod fingerprint;
pub mod matcher;
pub mod resource_tracker;
mod shared;
pub mod stats;

pub use cache::PatternCache;
pub use config::{PatternCacheConfig, PatternCacheConfigBuilder};
pub use entry::{CachedEntry, Entry};
pub use fingerprint::Fingerprint;
pub use matcher::MatchExecutor;
pub use resource_tracker::ResourceTracker;
pub use stats::Statistics;
