//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM over SQLite. Entity modules expose
//! pool-backed repositories for reads and administrative work, plus
//! connection-level helpers the upserter composes inside one transaction.

pub mod context;
pub mod matches;
pub mod models;
pub mod players;
pub mod pool;
pub mod scrape_logs;
pub mod series;
pub mod settings;
pub mod teams;
pub mod util;

pub use context::{ClearTarget, DatasetCounts, DbContext, SCHEMA_SQL};
pub use matches::MatchRepository;
pub use players::PlayerRepository;
pub use pool::{DbError, DbPool, SqliteConn};
pub use scrape_logs::ScrapeLogRepository;
pub use series::SeriesRepository;
pub use settings::{ScheduleTouch, SettingsRepository};
pub use teams::TeamRepository;

use chrono::{DateTime, Utc};

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string from the database.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

/// Current time in the stored text format.
pub fn now_text() -> String {
    Utc::now().to_rfc3339()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_fallbacks() {
        assert_eq!(parse_datetime("garbage"), DateTime::UNIX_EPOCH);
        assert_eq!(parse_datetime_opt(Some("garbage".into())), None);
        assert_eq!(parse_datetime_opt(None), None);
        let now = now_text();
        assert!(parse_datetime(&now) > DateTime::UNIX_EPOCH);
    }
}
