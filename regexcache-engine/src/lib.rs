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

//! The contract the pattern cache consumes from an external regular
//! expression engine, plus one concrete implementation.
//!
//! The cache core never depends on a concrete engine type: everything it
//! does is expressed in terms of the [`Engine`] trait, so swapping the
//! backing engine (a real FFI binding to RE2/PCRE2/Hyperscan, say) only
//! means writing a new impl of this trait. [`regex_lite::RegexLiteEngine`]
//! is the bundled implementation, backed by the `regex` crate — itself a
//! linear-time engine, so it is a faithful stand-in for "the externally
//! supplied, linear-time regular-expression engine" the cache is built
//! around without inventing an FFI boundary this workspace cannot vendor.

pub mod regex_lite;

use regexcache_common::Result;

/// Thin, total wrapper over an external regex engine's contract.
///
/// Every method here is meant to be O(compile) or O(match) — the cache
/// never does anything more expensive than calling one of these once per
/// cache miss or once per matching session. `release` on an engine whose
/// handle type can represent "no handle" must be a no-op; the bundled
/// adapter sidesteps the question entirely by making `Handle` always
/// valid once constructed.
pub trait Engine: Send + Sync + 'static {
    /// Opaque handle to one compiled pattern. Only this trait's methods
    /// ever touch the handle's internals; the cache treats it as opaque.
    type Handle: Send + Sync + 'static;

    /// Compile `pattern`. Returns a compilation error (never a panic) if
    /// the engine rejects the pattern, including the empty pattern.
    fn compile(&self, pattern: &str, case_sensitive: bool) -> Result<Self::Handle>;

    /// Defensive validity check used by `validate_on_hit`. Must be O(1).
    fn is_ok(&self, handle: &Self::Handle) -> bool;

    /// The engine-reported memory footprint of `handle`, in bytes. Safe
    /// to call more than once; implementations typically memoize this at
    /// compile time.
    fn memory_bytes(&self, handle: &Self::Handle) -> usize;

    /// Does `haystack` match `handle` over its entire length?
    fn full_match(&self, handle: &Self::Handle, haystack: &[u8]) -> Result<bool>;

    /// Does `haystack` contain a match for `handle` anywhere?
    fn partial_match(&self, handle: &Self::Handle, haystack: &[u8]) -> Result<bool>;

    /// Release the engine-allocated resource backing `handle`. Called at
    /// most once per handle returned by `compile`, mirroring a native
    /// `free`/`release` call that takes the handle by reference rather
    /// than by Rust ownership — the `Handle` value's own `Drop` (if any)
    /// still runs normally when the cache's last reference to it goes
    /// away; this method is the place for engine-side bookkeeping
    /// (decrementing a native refcount, say) that has to happen exactly
    /// once and exactly here. Errors observed here are the caller's (the
    /// cache's) responsibility to log and suppress — a leak is
    /// preferable to a double-free.
    fn release(&self, handle: &Self::Handle);
}
