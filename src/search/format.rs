//! Display formatting for search matches

use crate::model::{is_unknown, EstablishmentRecord};
use chrono::Weekday;

/// Returned instead of a display block when nothing matched
pub const NO_MATCHES: &str = "no matches found";

const PLACEHOLDER: &str = "-";

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full lowercase weekday name as used for opening-hours keys
pub fn weekday_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Capitalize the first letter of every word
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn or_placeholder(text: &str) -> String {
    if is_unknown(text) {
        PLACEHOLDER.to_string()
    } else {
        text.to_string()
    }
}

/// Render matches as numbered blocks separated by a blank line
///
/// Only the first `limit` matches are rendered; `today` selects the line
/// shown as today's hours.
pub fn format_matches(matches: &[EstablishmentRecord], limit: usize, today: Weekday) -> String {
    if matches.is_empty() {
        return NO_MATCHES.to_string();
    }

    matches
        .iter()
        .take(limit.max(1))
        .enumerate()
        .map(|(i, record)| format_record(i + 1, record, today))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Whole ratings keep one decimal place: `4.0`, `4.5`, `3.75`
fn format_rating(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{:.1}", rating)
    } else {
        rating.to_string()
    }
}

fn format_record(position: usize, record: &EstablishmentRecord, today: Weekday) -> String {
    let cuisines: Vec<String> = record
        .cuisines
        .iter()
        .filter(|c| !is_unknown(c))
        .map(|c| title_case(c))
        .collect();
    let cuisine = if cuisines.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        cuisines.join(", ")
    };

    let rating = record
        .rating
        .map(format_rating)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    let today_key = weekday_key(today);
    let today_hours = record
        .opening_hours
        .get(today_key)
        .map(|h| or_placeholder(h))
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    let mut lines = vec![
        format!("{}. 🍔 {}:", position, title_case(&record.name)),
        format!("🍽️ Cuisine: {}", cuisine),
        format!("⭐️ Rating: {}", rating),
        format!("👾 Website: {}", or_placeholder(&record.website)),
        format!("🕥 Today ({}): {}", title_case(today_key), today_hours),
    ];

    if record.opening_hours.is_empty() {
        lines.push(format!("📅 Hours: {}", PLACEHOLDER));
    } else {
        lines.push("📅 Hours:".to_string());
        for day in WEEK {
            let key = weekday_key(day);
            let hours = record
                .opening_hours
                .get(key)
                .map(|h| or_placeholder(h))
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            lines.push(format!("{}: {}", title_case(key), hours));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pizza_place() -> EstablishmentRecord {
        let mut record = EstablishmentRecord::new("pizza place");
        record.cuisines = vec!["italian".to_string(), "street food".to_string()];
        record.rating = Some(4.5);
        record.website = "https://pizza.example".to_string();
        record
            .opening_hours
            .insert("monday".to_string(), "9:00 am - 10:00 pm".to_string());
        record
            .opening_hours
            .insert("sunday".to_string(), "closed".to_string());
        record
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("pizza  place"), "Pizza Place");
        assert_eq!(title_case("éTTEREM"), "Étterem");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_format_full_record() {
        let text = format_matches(&[pizza_place()], 1, Weekday::Mon);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "1. 🍔 Pizza Place:");
        assert_eq!(lines[1], "🍽️ Cuisine: Italian, Street Food");
        assert_eq!(lines[2], "⭐️ Rating: 4.5");
        assert_eq!(lines[3], "👾 Website: https://pizza.example");
        assert_eq!(lines[4], "🕥 Today (Monday): 9:00 am - 10:00 pm");
        assert_eq!(lines[5], "📅 Hours:");
        assert_eq!(lines[6], "Monday: 9:00 am - 10:00 pm");
        assert_eq!(lines[7], "Tuesday: -");
        assert_eq!(lines[12], "Sunday: closed");
        assert_eq!(lines.len(), 13);
    }

    #[test]
    fn test_format_absent_fields_use_placeholder() {
        let text = format_matches(&[EstablishmentRecord::new("bare")], 1, Weekday::Fri);
        assert!(text.contains("🍽️ Cuisine: -"));
        assert!(text.contains("⭐️ Rating: -"));
        assert!(text.contains("👾 Website: -"));
        assert!(text.contains("🕥 Today (Friday): -"));
        assert!(text.contains("📅 Hours: -"));
        assert!(!text.contains("unknown"));
    }

    #[test]
    fn test_whole_rating_keeps_decimal() {
        let mut record = EstablishmentRecord::new("four");
        record.rating = Some(4.0);
        let text = format_matches(&[record], 1, Weekday::Mon);
        assert!(text.contains("⭐️ Rating: 4.0\n"));

        assert_eq!(format_rating(3.75), "3.75");
        assert_eq!(format_rating(5.0), "5.0");
    }

    #[test]
    fn test_format_caps_at_limit() {
        let records = vec![pizza_place(), EstablishmentRecord::new("second")];
        let one = format_matches(&records, 1, Weekday::Mon);
        assert!(!one.contains("Second"));

        let two = format_matches(&records, 2, Weekday::Mon);
        assert!(two.contains("\n\n2. 🍔 Second:"));
    }

    #[test]
    fn test_format_empty_is_sentinel() {
        assert_eq!(format_matches(&[], 1, Weekday::Mon), NO_MATCHES);
    }
}
