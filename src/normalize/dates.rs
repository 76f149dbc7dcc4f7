//! Date parsing for the formats seen on listing and match pages.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Display format for match dates derived from epoch timestamps.
pub const MATCH_DATE_FORMAT: &str = "%a, %b %d, %Y";

/// Formats tried in order by [`parse_date`].
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%a, %d %b %Y",
    "%d %b %Y",
    "%d-%m-%Y",
    "%d/%m/%Y",
    MATCH_DATE_FORMAT,
];

static TITLE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})\s*(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec)[a-z]*\s*(\d{4})")
        .unwrap()
});
static NAME_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec)[a-z]*\s*(\d{1,2})\b").unwrap()
});
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

/// Parse a date string using the known formats. ISO datetimes are accepted
/// and truncated to their date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Format an epoch-milliseconds timestamp (UTC) as "Sat, Jan 10, 2026".
pub fn format_epoch_ms(ms: i64) -> Option<String> {
    DateTime::from_timestamp(ms.div_euclid(1000), 0)
        .map(|dt| dt.format(MATCH_DATE_FORMAT).to_string())
}

/// Calendar date (UTC, "%Y-%m-%d") of an epoch-milliseconds timestamp.
pub fn epoch_ms_to_iso(ms: i64) -> Option<String> {
    DateTime::from_timestamp(ms.div_euclid(1000), 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

fn month_number(abbrev: &str) -> Option<u32> {
    let m = match &abbrev[..abbrev.len().min(3)] {
        "Jan" => 1,
        "Feb" => 2,
        "Mar" => 3,
        "Apr" => 4,
        "May" => 5,
        "Jun" => 6,
        "Jul" => 7,
        "Aug" => 8,
        "Sep" => 9,
        "Oct" => 10,
        "Nov" => 11,
        "Dec" => 12,
        _ => return None,
    };
    Some(m)
}

fn iso(year: i32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Start date from a listing title such as "Series, 12 Jan 2026 - 3 Feb 2026".
pub fn date_from_title(title: &str) -> Option<String> {
    let caps = TITLE_DATE.captures(title)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;
    iso(year, month, day)
}

/// Start date from a series name such as "Big Bash League, Dec 14".
/// The year comes from the name when present, else `default_year`.
pub fn date_from_name(name: &str, default_year: i32) -> Option<String> {
    let caps = NAME_DATE.captures(name)?;
    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year = YEAR
        .captures(name)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(default_year);
    iso(year, month, day)
}
