//! Append-only record of scrape runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Success,
    Error,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// A stored scrape-log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeLog {
    pub id: i32,
    /// Category tag such as `auto_daily`, `players:women` or `live`.
    pub category: Option<String>,
    pub status: LogStatus,
    pub message: Option<String>,
    pub teams_scraped: i32,
    pub players_scraped: i32,
    pub created_at: DateTime<Utc>,
}

/// A log row waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub category: String,
    pub status: LogStatus,
    pub message: String,
    pub teams_scraped: i32,
    pub players_scraped: i32,
}

impl LogEntry {
    pub fn success(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            status: LogStatus::Success,
            message: message.into(),
            teams_scraped: 0,
            players_scraped: 0,
        }
    }

    pub fn error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            status: LogStatus::Error,
            message: message.into(),
            teams_scraped: 0,
            players_scraped: 0,
        }
    }

    pub fn with_counts(mut self, teams: usize, players: usize) -> Self {
        self.teams_scraped = i32::try_from(teams).unwrap_or(i32::MAX);
        self.players_scraped = i32::try_from(players).unwrap_or(i32::MAX);
        self
    }
}
