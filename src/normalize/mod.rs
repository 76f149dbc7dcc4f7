//! Normalization helpers shared by parsers and the upserter.

pub mod dates;
pub mod slug;
pub mod team_names;

pub use dates::{date_from_name, date_from_title, epoch_ms_to_iso, format_epoch_ms, parse_date};
pub use slug::{slugify, SlugAllocator};
pub use team_names::{canonical_team_name, short_code};

/// Collapse internal whitespace runs and trim.
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Treat blank strings as absent.
pub fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
