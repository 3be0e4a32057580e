//! Fuzzy Matching
//!
//! Token-set similarity on a 0-100 scale, insensitive to word order and
//! repeated words, built on normalized Levenshtein similarity from strsim.

use std::collections::BTreeSet;
use strsim::normalized_levenshtein;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Similarity at or above which a field counts as a fuzzy match
pub const DEFAULT_THRESHOLD: u8 = 70;

/// Fuzzy matcher with a configurable threshold
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    threshold: u8,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyMatcher {
    /// Create a new fuzzy matcher with the default threshold
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Create a fuzzy matcher with a custom threshold (clamped to 100)
    pub fn with_threshold(threshold: u8) -> Self {
        Self {
            threshold: threshold.min(100),
        }
    }

    /// Check for a substring match; the needle is expected to be lowercased
    pub fn exact_match(&self, haystack: &str, needle: &str) -> bool {
        if needle.is_empty() {
            return false;
        }
        haystack.to_lowercase().contains(needle)
    }

    /// True when the token-set similarity reaches the threshold
    pub fn fuzzy_match(&self, haystack: &str, needle: &str) -> bool {
        token_set_ratio(needle, haystack) >= self.threshold
    }

    /// Substring or fuzzy match against a single field
    pub fn matches(&self, haystack: &str, needle: &str) -> bool {
        self.exact_match(haystack, needle) || self.fuzzy_match(haystack, needle)
    }
}

/// Split text into lowercase words after NFKC normalization
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text.nfkc().collect();
    normalized
        .unicode_words()
        .map(|w| w.to_lowercase())
        .collect()
}

/// Plain similarity of two strings on a 0-100 scale
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    (normalized_levenshtein(a, b) * 100.0).round() as u8
}

/// Token-set similarity on a 0-100 scale
///
/// Compares the sorted shared tokens against the shared tokens plus each
/// side's leftovers, so that `"pizza place"` and `"place pizza pizza"` score
/// 100 and a query fully contained in a longer name scores high.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let tokens_a: BTreeSet<String> = tokenize(a).into_iter().collect();
    let tokens_b: BTreeSet<String> = tokenize(b).into_iter().collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    let join = |set: Vec<&String>| {
        set.into_iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    };

    let intersection = join(tokens_a.intersection(&tokens_b).collect());
    let only_a = join(tokens_a.difference(&tokens_b).collect());
    let only_b = join(tokens_b.difference(&tokens_a).collect());

    let combine = |base: &str, rest: &str| match (base.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{} {}", base, rest),
    };

    let combined_a = combine(&intersection, &only_a);
    let combined_b = combine(&intersection, &only_b);

    let mut best = ratio(&combined_a, &combined_b);
    if !intersection.is_empty() {
        best = best
            .max(ratio(&intersection, &combined_a))
            .max(ratio(&intersection, &combined_b));
    }
    best
}
