//! Date handling for CRM deal records.
//!
//! Portal-entered dates show up either as ISO strings (`2024-07-01`,
//! optionally with a time suffix) or as US-style `M/D/YY[YY]`. Composite
//! deal names may carry a `7/29/24 - 8/5/24` stay range when no date
//! fields were filled in.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Compiled once at first use to avoid repeated compilation.
static US_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2,4})$").expect("US date regex is valid"));

static DATE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}/\d{1,2}/\d{2,4})\s*-\s*(\d{1,2}/\d{1,2}/\d{2,4})")
        .expect("date range regex is valid")
});

static DATE_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}/\d{1,2}/\d{2,4}").expect("date fragment regex is valid"));

/// Parse a calendar date in any of the accepted portal formats.
///
/// Two-digit years are 2000-based. Calendar-invalid input (`13/45/24`)
/// yields None rather than an error; reservation dates are best-effort.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(caps) = US_DATE.captures(raw) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let mut year: i32 = caps[3].parse().ok()?;
        if year < 100 {
            year += 2000;
        }
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    // ISO timestamp: keep the date part, drop the time suffix.
    if let Some(prefix) = raw.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
    }

    None
}

/// Extract a `M/D/YY - M/D/YY` stay range from a composite deal name.
pub fn extract_date_range(name: &str) -> Option<(String, String)> {
    let caps = DATE_RANGE.captures(name)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Whether a string contains anything that reads as a US-style date.
/// Used to keep stay ranges out of the location field.
pub fn contains_date_fragment(part: &str) -> bool {
    DATE_FRAGMENT.is_match(part)
}
