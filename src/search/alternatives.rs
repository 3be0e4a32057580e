//! Alternative query generation
//!
//! Widens a query that found nothing by dropping contiguous runs of words and
//! by correcting misspelled words in each of those variants.

use super::spelling::SpellChecker;
use std::collections::{HashMap, HashSet};

/// Derived query variants, deletion variants first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlternativeQuerySet {
    /// One entry per contiguous run of deleted words, `k * (k + 1) / 2` in total
    pub deletions: Vec<String>,
    /// Spell-corrected variants not already present in `deletions`
    pub corrections: Vec<String>,
}

impl AlternativeQuerySet {
    /// Build the full set for a query
    ///
    /// Each distinct word is looked up in the spell checker once, however
    /// many deletion variants contain it.
    pub fn generate(query: &str, spell: &dyn SpellChecker) -> Self {
        let deletions = deletion_variants(query);

        let mut fixes: HashMap<&str, Option<String>> = HashMap::new();
        for word in query.split_whitespace() {
            fixes.entry(word).or_insert_with(|| word_fix(word, spell));
        }

        let mut seen: HashSet<String> = deletions.iter().cloned().collect();
        let mut corrections: Vec<String> = Vec::new();
        for variant in &deletions {
            let corrected = apply_fixes(variant, |word| fixes.get(word).cloned().flatten());
            if let Some(corrected) = corrected {
                if seen.insert(corrected.clone()) {
                    corrections.push(corrected);
                }
            }
        }

        Self {
            deletions,
            corrections,
        }
    }

    /// Every variant, deletions then corrections
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.deletions
            .iter()
            .chain(self.corrections.iter())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.deletions.len() + self.corrections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All variants formed by deleting one contiguous run of words
///
/// For `a b c` this yields `b c`, `c`, ``, `a c`, `a`, `a b`.
pub fn deletion_variants(query: &str) -> Vec<String> {
    let words: Vec<&str> = query.split_whitespace().collect();
    let mut variants = Vec::with_capacity(words.len() * (words.len() + 1) / 2);

    for start in 0..words.len() {
        for end in (start + 1)..=words.len() {
            let kept: Vec<&str> = words[..start]
                .iter()
                .chain(words[end..].iter())
                .copied()
                .collect();
            variants.push(kept.join(" "));
        }
    }

    variants
}

/// Replace every misspelled word with its top suggestion
///
/// Returns None when nothing changed. Phrase suggestions contribute only
/// their first word.
pub fn spell_correct(query: &str, spell: &dyn SpellChecker) -> Option<String> {
    apply_fixes(query, |word| word_fix(word, spell))
}

/// The replacement for one word, or None when it stays as it is
fn word_fix(word: &str, spell: &dyn SpellChecker) -> Option<String> {
    if spell.is_known(word) {
        return None;
    }
    spell
        .correction(word)
        .and_then(|s| s.split_whitespace().next().map(str::to_string))
        .filter(|fix| fix != word)
}

fn apply_fixes<F>(query: &str, mut fix: F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut changed = false;
    let corrected: Vec<String> = query
        .split_whitespace()
        .map(|word| match fix(word) {
            Some(fixed) => {
                changed = true;
                fixed
            }
            None => word.to_string(),
        })
        .collect();

    changed.then(|| corrected.join(" "))
}
