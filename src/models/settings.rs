//! Persisted scheduler configuration.
//!
//! Times of day are "HH:MM" in the runtime's local time zone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Global team and roster scrape settings (single row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeSetting {
    pub id: i32,
    pub auto_scrape_enabled: bool,
    pub scrape_time: String,
    pub last_scrape: Option<DateTime<Utc>>,
    pub player_auto_scrape_enabled: bool,
    pub player_scrape_time: String,
    pub last_player_scrape: Option<DateTime<Utc>>,
    pub intl_auto: bool,
    pub intl_time: String,
    pub domestic_auto: bool,
    pub domestic_time: String,
    pub league_auto: bool,
    pub league_time: String,
    pub women_auto: bool,
    pub women_time: String,
    pub updated_at: DateTime<Utc>,
}

impl ScrapeSetting {
    /// Roster schedule for one team category: (enabled, "HH:MM").
    pub fn category_players(&self, slug: &str) -> Option<(bool, &str)> {
        match slug {
            "international" => Some((self.intl_auto, &self.intl_time)),
            "domestic" => Some((self.domestic_auto, &self.domestic_time)),
            "league" => Some((self.league_auto, &self.league_time)),
            "women" => Some((self.women_auto, &self.women_time)),
            _ => None,
        }
    }
}

/// Per-category daily schedule, used for both profile and series scrapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySchedule {
    pub id: i32,
    pub category_slug: String,
    pub auto_scrape_enabled: bool,
    pub scrape_time: String,
    pub last_scrape: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Interval schedule for the all-series match scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScrapeSetting {
    pub id: i32,
    pub auto_scrape_enabled: bool,
    pub interval_hours: i32,
    pub last_scrape: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Interval schedule for the live-score board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveScoreScrapeSetting {
    pub id: i32,
    pub auto_scrape_enabled: bool,
    pub interval_seconds: i32,
    pub last_scrape: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}
