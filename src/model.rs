//! Establishment records
//!
//! The canonical unit written by the add pipeline and read back in bulk by the
//! search engine. Every key is always present in the serialized form; absent
//! text is the [`UNKNOWN`] sentinel, absent numbers are `null`.

use crate::error::AppError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Sentinel stored for text fields the provider did not return
pub const UNKNOWN: &str = "unknown";

fn unknown() -> String {
    UNKNOWN.to_string()
}

/// True for the sentinel or an empty string
pub fn is_unknown(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNKNOWN)
}

/// A restaurant, bar or cafe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstablishmentRecord {
    pub name: String,
    pub description: String,
    pub address: String,
    pub website: String,
    pub phone: String,
    pub rating: Option<f64>,
    pub cuisines: Vec<String>,
    pub category: String,
    /// Lowercase weekday name -> hours text
    pub opening_hours: BTreeMap<String, String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl EstablishmentRecord {
    /// Create a record with only a name; every other field is absent
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: unknown(),
            address: unknown(),
            website: unknown(),
            phone: unknown(),
            rating: None,
            cuisines: Vec::new(),
            category: unknown(),
            opening_hours: BTreeMap::new(),
            latitude: None,
            longitude: None,
        }
    }

    /// Parse a stored row, rejecting rows without a usable name
    ///
    /// Every other field is read on its own: a value of the wrong shape
    /// becomes the absent value for that field. Where a legacy key and its
    /// current key are both present the current key wins.
    pub fn from_row(row: Value) -> Result<Self, AppError> {
        let name = row
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let (Some(name), Value::Object(map)) = (name, &row) else {
            return Err(AppError::MalformedRecord(format!(
                "stored record has no name: {}",
                row
            )));
        };

        Ok(Self {
            description: text(field(map, &["description"])),
            address: text(field(map, &["address", "address_string"])),
            website: text(field(map, &["website"])),
            phone: text(field(map, &["phone"])),
            rating: number(field(map, &["rating"])),
            cuisines: cuisines(field(map, &["cuisines"])),
            category: text(field(map, &["category"])),
            opening_hours: hours(field(map, &["opening_hours", "hours"])),
            latitude: number(field(map, &["latitude"])),
            longitude: number(field(map, &["longitude"])),
            name,
        })
    }

    /// Check the record invariants before persisting
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Establishment name cannot be empty".to_string(),
            ));
        }
        if let Some(rating) = self.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(AppError::InvalidInput(format!(
                    "Rating {} is outside the 0-5 scale",
                    rating
                )));
            }
        }
        Ok(())
    }

    /// Lowercase every text field, trimming surrounding whitespace
    pub fn normalized(self) -> Self {
        fn norm(text: String) -> String {
            text.trim().to_lowercase()
        }

        Self {
            name: norm(self.name),
            description: norm(self.description),
            address: norm(self.address),
            website: norm(self.website),
            phone: norm(self.phone),
            rating: self.rating,
            cuisines: self.cuisines.into_iter().map(norm).collect(),
            category: norm(self.category),
            opening_hours: self
                .opening_hours
                .into_iter()
                .map(|(day, hours)| (norm(day), norm(hours)))
                .collect(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Cuisines joined the way they are displayed and searched
    pub fn cuisines_joined(&self) -> String {
        self.cuisines.join(", ")
    }
}

/// Parse provider weekday text such as `"Monday: 9:00 AM - 10:00 PM"`
pub fn parse_weekday_text<I, S>(lines: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let (day, hours) = line.as_ref().split_once(':')?;
            let day = day.trim().to_lowercase();
            let hours = hours.trim();
            if day.is_empty() || hours.is_empty() {
                return None;
            }
            Some((day, hours.to_string()))
        })
        .collect()
}

/// First non-null value among a field's keys
fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => unknown(),
    }
}

// Providers and older rows store numbers as strings
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn cuisines(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn hours(value: Option<&Value>) -> BTreeMap<String, String> {
    match value {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(day, hours)| Some((day.to_lowercase(), hours.as_str()?.to_string())))
            .collect(),
        Some(Value::Array(lines)) => parse_weekday_text(lines.iter().filter_map(Value::as_str)),
        _ => BTreeMap::new(),
    }
}
