//! Domain models for the cricket dataset.

mod category;
mod cricket_match;
mod player;
mod scrape_log;
mod series;
mod settings;
mod state;
mod team;

pub use category::{
    series_category, team_category, Category, CategoryDef, SERIES_CATEGORIES, TEAM_CATEGORIES,
};
pub use cricket_match::Match;
pub use player::{
    CareerSpan, CareerTimeline, FormatStats, LegacyBatting, LegacyBowling, LegacyStats, Player,
    FORMATS,
};
pub use scrape_log::{LogEntry, LogStatus, ScrapeLog};
pub use series::Series;
pub use settings::{CategorySchedule, LiveScoreScrapeSetting, MatchScrapeSetting, ScrapeSetting};
pub use state::MatchState;
pub use team::Team;
