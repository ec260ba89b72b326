//! ISO-8601 Module
//!
//! Formats instants in the canonical `YYYY-MM-DDTHH:MM:SS.sssZ` form and
//! parses date strings, either loosely or in canonical form only.

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Offsetless date-time layouts, read as UTC.
const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

// == Format ==
/// Formats an instant as canonical ISO-8601 with millisecond precision.
///
/// Years outside `0..=9999` use the expanded form with a sign and six digits,
/// e.g. `+010000-01-01T00:00:00.000Z`.
pub fn format_iso(instant: &DateTime<Utc>) -> String {
    let year = instant.year();
    let rest = instant.format("%m-%dT%H:%M:%S%.3fZ");

    if (0..=9999).contains(&year) {
        format!("{:04}-{}", year, rest)
    } else {
        let sign = if year < 0 { '-' } else { '+' };
        format!("{}{:06}-{}", sign, year.unsigned_abs(), rest)
    }
}

// == Loose Parse ==
/// Parses a date string in any of the accepted layouts.
///
/// Accepts RFC 3339 with any offset, expanded-year ISO-8601, offsetless
/// ISO-8601 date-times and plain dates (both read as UTC), and RFC 2822.
/// Leap seconds (`23:59:60`) are rejected in every layout.
pub fn parse_loose(text: &str) -> Option<DateTime<Utc>> {
    parse_layouts(text).filter(|instant| instant.timestamp_subsec_nanos() < 1_000_000_000)
}

fn parse_layouts(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(parsed) = parse_expanded_year(text) {
        return Some(parsed);
    }

    for layout in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    DateTime::parse_from_rfc2822(text)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

// == Canonical Parse ==
/// Parses `text` only if it is the exact canonical rendering of an instant.
///
/// The string is parsed, formatted again, and compared byte for byte.
pub fn parse_canonical(text: &str) -> Option<DateTime<Utc>> {
    parse_loose(text).filter(|instant| format_iso(instant) == text)
}

/// Parses `±YYYYYY-MM-DDTHH:MM:SS[.fff]Z`.
fn parse_expanded_year(text: &str) -> Option<DateTime<Utc>> {
    let sign = match text.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };

    let digits = text.get(1..7)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year = sign * digits.parse::<i64>().ok()?;
    // -000000 is not a year
    if sign < 0 && year == 0 {
        return None;
    }

    let mut parsed = Parsed::new();
    format::parse(
        &mut parsed,
        &text[7..],
        StrftimeItems::new("-%m-%dT%H:%M:%S%.fZ"),
    )
    .ok()?;
    parsed.set_year(year).ok()?;
    parsed.to_datetime_with_timezone(&Utc).ok()
}
