//! Search Engine
//!
//! Finds stored establishments for an imprecise query. Three passes run in
//! order, each only when the previous one found nothing:
//!
//! 1. substring or fuzzy match on name, description, cuisines and category
//! 2. exact, case-insensitive name equality
//! 3. the primary matcher over every alternative query, unioned and deduped

use super::alternatives::AlternativeQuerySet;
use super::format::format_matches;
use super::fuzzy::{token_set_ratio, FuzzyMatcher};
use super::spelling::{DictionarySpellChecker, SpellChecker};
use crate::config::DEFAULT_DISPLAY_LIMIT;
use crate::model::{is_unknown, EstablishmentRecord};
use chrono::{Datelike, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Which pass produced the matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPass {
    Primary,
    ExactName,
    Alternatives,
}

/// Result of a search over the stored records
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Matches ranked best first
    Matches {
        records: Vec<EstablishmentRecord>,
        pass: MatchPass,
    },
    NoMatches,
}

impl SearchOutcome {
    pub fn records(&self) -> &[EstablishmentRecord] {
        match self {
            SearchOutcome::Matches { records, .. } => records,
            SearchOutcome::NoMatches => &[],
        }
    }
}

/// Search engine over establishment records
#[derive(Clone)]
pub struct SearchEngine {
    fuzzy_matcher: FuzzyMatcher,
    spell_checker: Option<Arc<dyn SpellChecker>>,
    display_limit: usize,
    timezone: Tz,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    /// Create a new search engine with default configuration
    pub fn new() -> Self {
        Self {
            fuzzy_matcher: FuzzyMatcher::new(),
            spell_checker: None,
            display_limit: DEFAULT_DISPLAY_LIMIT,
            timezone: chrono_tz::Europe::Budapest,
        }
    }

    pub fn with_matcher(mut self, matcher: FuzzyMatcher) -> Self {
        self.fuzzy_matcher = matcher;
        self
    }

    /// Use a fixed spell checker instead of one built from the records
    pub fn with_spell_checker(mut self, checker: Arc<dyn SpellChecker>) -> Self {
        self.spell_checker = Some(checker);
        self
    }

    pub fn with_display_limit(mut self, limit: usize) -> Self {
        self.display_limit = limit.max(1);
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Parse stored rows, skipping malformed ones
    pub fn parse_rows(rows: Vec<Value>) -> Vec<EstablishmentRecord> {
        let total = rows.len();
        let records: Vec<EstablishmentRecord> = rows
            .into_iter()
            .filter_map(|row| match EstablishmentRecord::from_row(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping stored record: {}", e);
                    None
                }
            })
            .collect();

        if records.len() < total {
            debug!("Parsed {} of {} stored records", records.len(), total);
        }
        records
    }

    /// Search records with a query string
    pub fn search(&self, query: &str, records: &[EstablishmentRecord]) -> SearchOutcome {
        let query = query.trim().to_lowercase();
        if query.is_empty() || records.is_empty() {
            return SearchOutcome::NoMatches;
        }

        let primary = self.primary_matches(&query, records);
        if !primary.is_empty() {
            debug!("Primary pass matched {} records", primary.len());
            return SearchOutcome::Matches {
                records: primary,
                pass: MatchPass::Primary,
            };
        }

        let exact: Vec<EstablishmentRecord> = records
            .iter()
            .filter(|r| r.name.trim().to_lowercase() == query)
            .cloned()
            .collect();
        if !exact.is_empty() {
            debug!("Exact name pass matched {} records", exact.len());
            return SearchOutcome::Matches {
                records: exact,
                pass: MatchPass::ExactName,
            };
        }

        let alternatives = self.alternative_matches(&query, records);
        if !alternatives.is_empty() {
            debug!("Alternative pass matched {} records", alternatives.len());
            return SearchOutcome::Matches {
                records: alternatives,
                pass: MatchPass::Alternatives,
            };
        }

        SearchOutcome::NoMatches
    }

    /// Search stored rows and render the result for display
    pub fn search_and_format(&self, query: &str, rows: Vec<Value>) -> String {
        let records = Self::parse_rows(rows);
        let outcome = self.search(query, &records);
        let today = Utc::now().with_timezone(&self.timezone).weekday();
        format_matches(outcome.records(), self.display_limit, today)
    }

    /// Substring or fuzzy match on any searchable field, best name score first
    fn primary_matches(&self, query: &str, records: &[EstablishmentRecord]) -> Vec<EstablishmentRecord> {
        let fields: Vec<Vec<String>> = records.iter().map(searchable_fields).collect();
        let mut matches: Vec<EstablishmentRecord> = self
            .matching_indices(query, &fields)
            .map(|i| records[i].clone())
            .collect();

        // Stable sort keeps store order among equal scores
        matches.sort_by_cached_key(|r| std::cmp::Reverse(token_set_ratio(query, &r.name)));
        matches
    }

    fn matching_indices<'a>(
        &'a self,
        query: &'a str,
        fields: &'a [Vec<String>],
    ) -> impl Iterator<Item = usize> + 'a {
        fields
            .iter()
            .enumerate()
            .filter(move |(_, fields)| {
                !query.is_empty() && fields.iter().any(|field| self.fuzzy_matcher.matches(field, query))
            })
            .map(|(i, _)| i)
    }

    fn alternative_matches(&self, query: &str, records: &[EstablishmentRecord]) -> Vec<EstablishmentRecord> {
        let built;
        let spell: &dyn SpellChecker = match &self.spell_checker {
            Some(checker) => checker.as_ref(),
            None => {
                built = DictionarySpellChecker::from_records(records);
                &built
            }
        };

        let set = AlternativeQuerySet::generate(query, spell);
        if set.is_empty() {
            return Vec::new();
        }
        debug!("Trying {} alternative queries for '{}'", set.len(), query);

        // Fields are extracted once and shared by every alternative
        let fields: Vec<Vec<String>> = records.iter().map(searchable_fields).collect();
        let mut hit = vec![false; records.len()];
        for alternative in set.iter() {
            for i in self.matching_indices(alternative, &fields) {
                hit[i] = true;
            }
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut union: Vec<EstablishmentRecord> = records
            .iter()
            .zip(hit)
            .filter(|(_, hit)| *hit)
            .map(|(record, _)| record)
            .filter(|record| seen.insert(dedup_key(record)))
            .cloned()
            .collect();

        union.sort_by_cached_key(|r| (std::cmp::Reverse(token_set_ratio(query, &r.name)), r.name.clone()));
        union
    }
}

/// Name, description, joined cuisines and category, skipping absent ones
fn searchable_fields(record: &EstablishmentRecord) -> Vec<String> {
    [
        record.name.clone(),
        record.description.clone(),
        record.cuisines_joined(),
        record.category.clone(),
    ]
    .into_iter()
    .filter(|field| !is_unknown(field))
    .collect()
}

/// Two records are duplicates only when every field matches
fn dedup_key(record: &EstablishmentRecord) -> String {
    serde_json::to_string(record).unwrap_or_else(|_| format!("{:?}", record))
}
