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

//! The cache key: a pattern's text paired with its case-sensitivity.

use std::sync::Arc;

/// Composite cache key `(pattern_text, case_sensitive)`.
///
/// Equality and hashing are on the pair; pattern text is compared
/// verbatim — no normalization, no trimming, no case-folding of the text
/// itself (that's what the `case_sensitive` flag is for).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pattern: Arc<str>,
    case_sensitive: bool,
}

impl Fingerprint {
    /// Build a fingerprint from a pattern and its case-sensitivity.
    pub fn new(pattern: impl Into<Arc<str>>, case_sensitive: bool) -> Self {
        Self {
            pattern: pattern.into(),
            case_sensitive,
        }
    }

    /// The pattern text, verbatim.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether this fingerprint is for a case-sensitive compile.
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn case_sensitivity_discriminates_fingerprints() {
        let sensitive = Fingerprint::new("abc", true);
        let insensitive = Fingerprint::new("abc", false);
        assert_ne!(sensitive, insensitive);
    }

    #[test_log::test]
    fn identical_pairs_are_equal() {
        let a = Fingerprint::new("abc", true);
        let b = Fingerprint::new("abc", true);
        assert_eq!(a, b);
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test_log::test]
    fn pattern_text_is_compared_verbatim() {
        assert_ne!(Fingerprint::new("abc", true), Fingerprint::new("ABC", true));
        assert_ne!(Fingerprint::new("abc ", true), Fingerprint::new("abc", true));
    }
}
