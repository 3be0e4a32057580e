//! Fuzzy establishment search
//!
//! Matches an imprecise query against stored establishment records and renders
//! the best match for display.

pub mod alternatives;
pub mod engine;
pub mod format;
pub mod fuzzy;
pub mod spelling;


pub use engine::SearchEngine;
pub use fuzzy::FuzzyMatcher;
pub use format::NO_MATCHES;
