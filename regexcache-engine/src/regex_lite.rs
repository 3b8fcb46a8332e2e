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

//! A concrete [`Engine`] backed by the `regex` crate.

use regex::bytes::{Regex, RegexBuilder};
use regexcache_common::error::{truncate_pattern, Error};
use regexcache_common::Result;

use crate::Engine;

/// A compiled pattern handle. Carries the compiled automaton plus the
/// memory estimate captured once at compile time, mirroring how real
/// native engines report footprint once per handle and cache the value
/// rather than recomputing it on every query.
pub struct RegexHandle {
    regex: Regex,
    memory_bytes: usize,
}

/// [`Engine`] implementation backed by `regex::bytes::Regex`.
///
/// `regex`'s automaton runs in time linear in the size of the haystack
/// with no catastrophic-backtracking failure mode, standing in for the
/// externally supplied, linear-time regular-expression engine this
/// crate is coordination plumbing for.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexLiteEngine;

impl RegexLiteEngine {
    /// Construct a new adapter. Stateless: every method only touches the
    /// handle it is given.
    pub fn new() -> Self {
        Self
    }

    /// Approximate the native memory footprint of a compiled pattern.
    ///
    /// `regex` does not expose an introspectable byte size for its
    /// compiled automaton, so this is a deterministic, documented
    /// approximation (proportional to pattern length, with a fixed
    /// per-compile overhead) rather than a measured value. A real FFI
    /// adapter backed by an engine that reports true footprint (RE2's
    /// `ProgramSize`, for instance) would replace this with the engine's
    /// own answer.
    fn estimate_memory_bytes(pattern: &str) -> usize {
        const BASE_OVERHEAD_BYTES: usize = 256;
        const BYTES_PER_PATTERN_CHAR: usize = 24;
        BASE_OVERHEAD_BYTES + pattern.len() * BYTES_PER_PATTERN_CHAR
    }
}

impl Engine for RegexLiteEngine {
    type Handle = RegexHandle;

    fn compile(&self, pattern: &str, case_sensitive: bool) -> Result<Self::Handle> {
        if pattern.is_empty() {
            return Err(Error::CompilationFailed {
                pattern: String::new(),
                message: "empty pattern is not a valid regular expression".to_string(),
            });
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|err| {
                tracing::warn!(target: "regexcache_engine::regex_lite", pattern = %truncate_pattern(pattern), error = %err, "pattern rejected by regex engine");
                Error::CompilationFailed {
                    pattern: truncate_pattern(pattern),
                    message: err.to_string(),
                }
            })?;

        let memory_bytes = Self::estimate_memory_bytes(pattern);
        tracing::trace!(target: "regexcache_engine::regex_lite", memory_bytes, "pattern compiled");
        Ok(RegexHandle { regex, memory_bytes })
    }

    fn is_ok(&self, _handle: &Self::Handle) -> bool {
        // `regex::bytes::Regex` is immutable and has no internal
        // corruption state once constructed; it is always valid.
        true
    }

    fn memory_bytes(&self, handle: &Self::Handle) -> usize {
        handle.memory_bytes
    }

    fn full_match(&self, handle: &Self::Handle, haystack: &[u8]) -> Result<bool> {
        match handle.regex.find(haystack) {
            Some(m) => Ok(m.start() == 0 && m.end() == haystack.len()),
            None => Ok(false),
        }
    }

    fn partial_match(&self, handle: &Self::Handle, haystack: &[u8]) -> Result<bool> {
        Ok(handle.regex.is_match(haystack))
    }

    fn release(&self, _handle: &Self::Handle) {
        // There is no native resource beyond Rust's own allocator behind
        // `regex::bytes::Regex`; the compiled automaton is reclaimed when
        // the cache drops its last reference to the handle.
        tracing::trace!(target: "regexcache_engine::regex_lite", "handle released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn compiles_and_matches() {
        let engine = RegexLiteEngine::new();
        let handle = engine.compile(r"\d+", true).unwrap();
        assert!(engine.partial_match(&handle, b"abc123").unwrap());
        assert!(!engine.full_match(&handle, b"abc123").unwrap());
        assert!(engine.full_match(&handle, b"123").unwrap());
    }

    #[test_log::test]
    fn case_sensitivity_is_honored() {
        let engine = RegexLiteEngine::new();
        let sensitive = engine.compile("abc", true).unwrap();
        let insensitive = engine.compile("abc", false).unwrap();
        assert!(!engine.partial_match(&sensitive, b"ABC").unwrap());
        assert!(engine.partial_match(&insensitive, b"ABC").unwrap());
    }

    #[test_log::test]
    fn empty_pattern_is_rejected() {
        let engine = RegexLiteEngine::new();
        let err = engine.compile("", true).unwrap_err();
        assert!(matches!(err, Error::CompilationFailed { .. }));
    }

    #[test_log::test]
    fn invalid_pattern_is_rejected() {
        let engine = RegexLiteEngine::new();
        let err = engine.compile("[invalid", true).unwrap_err();
        assert!(matches!(err, Error::CompilationFailed { .. }));
    }

    #[test_log::test]
    fn memory_bytes_is_stable_across_calls() {
        let engine = RegexLiteEngine::new();
        let handle = engine.compile(r"[a-z]+", true).unwrap();
        let first = engine.memory_bytes(&handle);
        let second = engine.memory_bytes(&handle);
        assert_eq!(first, second);
    }

    #[test_log::test]
    fn release_is_a_no_op_drop() {
        let engine = RegexLiteEngine::new();
        let handle = engine.compile("ok", true).unwrap();
        engine.release(&handle);
    }
}
