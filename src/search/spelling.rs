//! Spelling suggestions for the alternative-query fallback
//!
//! The dictionary is a bundled list of common English and food words plus
//! every token found in the stored records, so the names of places already
//! on the list are always "correctly spelled".

use super::fuzzy::tokenize;
use crate::model::{is_unknown, EstablishmentRecord};
use std::collections::HashMap;
use strsim::damerau_levenshtein;

/// Words shorter than this are never flagged as misspelled
const MIN_CHECKED_LEN: usize = 3;

/// Largest edit distance a suggestion may be from the misspelled word
const MAX_EDIT_DISTANCE: usize = 2;

/// Source of spelling suggestions
pub trait SpellChecker: Send + Sync {
    /// True when the word needs no correction
    fn is_known(&self, word: &str) -> bool;

    /// Best correction for an unknown word
    fn correction(&self, word: &str) -> Option<String>;
}

const COMMON_WORDS: &[&str] = &[
    // everyday words found in place names and queries
    "the", "and", "bar", "pub", "cafe", "coffee", "house", "place", "kitchen",
    "restaurant", "bistro", "grill", "garden", "street", "corner", "club",
    "room", "home", "city", "old", "new", "little", "big", "good", "best",
    "great", "golden", "green", "red", "black", "white", "blue", "royal",
    "king", "queen", "brothers", "family", "food", "market", "hall", "shop",
    "bakery", "deli", "diner", "tavern", "inn", "lounge", "terrace", "rooftop",
    "wine", "beer", "craft", "cocktail", "cocktails", "tea", "juice", "bakehouse",
    "cheap", "fast", "late", "night", "open", "near", "with", "for", "from",
    // cuisines and dishes
    "pizza", "pizzeria", "pasta", "burger", "burgers", "sushi", "ramen",
    "noodle", "noodles", "taco", "tacos", "kebab", "steak", "steakhouse",
    "seafood", "fish", "chicken", "vegan", "vegetarian", "salad", "soup",
    "sandwich", "breakfast", "brunch", "lunch", "dinner", "dessert", "cake",
    "ice", "cream", "chocolate", "bread", "goulash", "langos", "strudel",
    "italian", "french", "greek", "turkish", "indian", "thai", "chinese",
    "japanese", "korean", "vietnamese", "mexican", "spanish", "american",
    "hungarian", "european", "asian", "mediterranean", "international",
    "street", "fusion", "healthy", "grilled", "fried", "spicy", "sweet",
];

/// Frequency dictionary backed spell checker
#[derive(Debug, Clone, Default)]
pub struct DictionarySpellChecker {
    words: HashMap<String, usize>,
}

impl DictionarySpellChecker {
    /// Dictionary holding only the bundled words
    pub fn new() -> Self {
        let mut checker = Self::default();
        checker.extend(COMMON_WORDS.iter().copied());
        checker
    }

    /// Bundled words plus every token of the given records
    pub fn from_records(records: &[EstablishmentRecord]) -> Self {
        let mut checker = Self::new();
        for record in records {
            let fields = [
                record.name.as_str(),
                record.description.as_str(),
                record.category.as_str(),
            ];
            for field in fields.into_iter().filter(|f| !is_unknown(f)) {
                checker.extend(tokenize(field));
            }
            for cuisine in &record.cuisines {
                checker.extend(tokenize(cuisine));
            }
        }
        checker
    }

    /// Add words to the dictionary, counting repeats
    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref().trim().to_lowercase();
            if !word.is_empty() {
                *self.words.entry(word).or_insert(0) += 1;
            }
        }
    }
}

impl SpellChecker for DictionarySpellChecker {
    fn is_known(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        word.chars().count() < MIN_CHECKED_LEN
            || word.chars().any(|c| c.is_numeric())
            || self.words.contains_key(&word)
    }

    fn correction(&self, word: &str) -> Option<String> {
        let word = word.to_lowercase();
        self.words
            .iter()
            .filter_map(|(candidate, freq)| {
                let distance = damerau_levenshtein(&word, candidate);
                (distance <= MAX_EDIT_DISTANCE).then_some((distance, *freq, candidate))
            })
            // smallest distance, then most frequent, then alphabetical
            .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)).then(a.2.cmp(b.2)))
            .map(|(_, _, candidate)| candidate.clone())
    }
}
