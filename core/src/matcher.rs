//! Name normalization for OCR-tolerant roster lookups.
//!
//! OCR reliably confuses a small set of glyphs (`0`/`O`, `1`/`l`/`I`).
//! Rather than correcting names at parse time, both sides of a comparison
//! are folded into the same normal form here.

use crate::config::MatcherConfig;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct NameMatcher {
    folds: BTreeMap<char, char>,
}

impl NameMatcher {
    pub fn new(config: &MatcherConfig) -> Self {
        let mut folds = BTreeMap::new();
        for group in &config.confusables {
            let Some(&representative) = group.first() else {
                continue;
            };
            for &c in group {
                // Groups are matched after case-folding, so fold the keys too.
                for lower in c.to_lowercase() {
                    folds.entry(lower).or_insert(representative);
                }
            }
        }
        Self { folds }
    }

    /// Trim, collapse inner whitespace, case-fold, then fold confusables.
    pub fn normalize(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len());
        for (i, word) in name.split_whitespace().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            for c in word.chars().flat_map(char::to_lowercase) {
                out.push(*self.folds.get(&c).unwrap_or(&c));
            }
        }
        out
    }

    pub fn is_exact(&self, candidate: &str, name: &str) -> bool {
        self.normalize(candidate) == self.normalize(name)
    }
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new(&MatcherConfig::default())
    }
}

/// Either normalized form is a prefix of the other. Empty candidates never match.
pub fn is_prefix_match(candidate: &str, name: &str) -> bool {
    !candidate.is_empty() && (name.starts_with(candidate) || candidate.starts_with(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_confusables() {
        let m = NameMatcher::default();
        assert_eq!(m.normalize("ChatzO1"), m.normalize("Chatz01"));
        assert_eq!(m.normalize("ZEL0S"), "zelos");
        assert_eq!(m.normalize("Paul"), m.normalize("PAUI"));
        assert_eq!(m.normalize("  Dave   the  Farmer "), "dave the farmer");
    }

    #[test]
    fn custom_groups_extend_the_fold_set() {
        let config = MatcherConfig {
            confusables: vec![vec!['s', '5']],
        };
        let m = NameMatcher::new(&config);
        assert!(m.is_exact("Ca5per", "Casper"));
        // Default folds are not implied once a custom set is given.
        assert!(!m.is_exact("Chatz01", "ChatzO1"));
    }

    #[test]
    fn prefix_match_is_symmetric_and_rejects_empty() {
        assert!(is_prefix_match("chatz", "chatzol"));
        assert!(is_prefix_match("chatzolxx", "chatzol"));
        assert!(!is_prefix_match("", "chatzol"));
        assert!(!is_prefix_match("zel", "chatzol"));
    }
}
