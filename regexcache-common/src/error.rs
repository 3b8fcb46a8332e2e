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

//! Error kinds surfaced by the pattern cache and its collaborators.
//!
//! Four kinds only, matching the failure taxonomy the cache is built
//! around: a pattern the engine rejected, a soft cap that would have been
//! breached, the engine adapter being unable to operate at all, and a
//! defensive invariant violation that indicates a bug in the caller or
//! in this crate.

use std::fmt;

/// The cap a [`Error::ResourceExhausted`] breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// `max_active_handles` would have been exceeded.
    ActiveHandles,
    /// `max_matchers_per_entry` would have been exceeded for one entry.
    MatchersPerEntry,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActiveHandles => write!(f, "max_active_handles"),
            Self::MatchersPerEntry => write!(f, "max_matchers_per_entry"),
        }
    }
}

const TRUNCATED_PATTERN_LEN: usize = 128;

/// Truncate a pattern for safe inclusion in error messages and logs.
pub fn truncate_pattern(pattern: &str) -> String {
    if pattern.len() <= TRUNCATED_PATTERN_LEN {
        pattern.to_string()
    } else {
        let mut truncated: String = pattern.chars().take(TRUNCATED_PATTERN_LEN).collect();
        truncated.push_str("...");
        truncated
    }
}

/// The error type shared by every crate in the workspace.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The engine rejected the pattern at compile time. Never cached.
    #[error("pattern compilation failed for `{pattern}`: {message}")]
    CompilationFailed {
        /// Truncated (for safety) pattern text.
        pattern: String,
        /// The engine's own error message.
        message: String,
    },

    /// A soft cap would have been exceeded. No entry was allocated and no
    /// counter was left in an inconsistent state.
    #[error("resource exhausted: {kind} would be exceeded")]
    ResourceExhausted {
        /// Which cap was breached.
        kind: ResourceKind,
    },

    /// The engine adapter could not operate: native library load failure,
    /// or an invalid handle detected on validation.
    #[error("engine fault: {0}")]
    EngineFault(String),

    /// Defensive: a programming error such as operating on a released
    /// entry. Indicates a bug, not a runtime condition callers should
    /// expect to handle.
    #[error("invariant violation: {0}")]
    InvalidState(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
