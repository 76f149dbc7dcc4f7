use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MatchState;

/// A match as stored.
///
/// Provider ids for the series, teams and venue are kept denormalized so a
/// match survives even when its series row is unknown locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: i32,
    /// Provider match id.
    pub match_id: String,
    pub series_id: Option<String>,
    pub team1_id: Option<String>,
    pub team2_id: Option<String>,
    pub venue_id: Option<String>,
    /// Short descriptor such as "1st ODI".
    pub match_desc: Option<String>,
    /// Format type such as "ODI", "T20I" or "TEST".
    pub match_format: Option<String>,
    pub venue: Option<String>,
    pub match_date: Option<String>,
    pub state: MatchState,
    pub team1_name: Option<String>,
    pub team2_name: Option<String>,
    pub team1_score: Option<String>,
    pub team2_score: Option<String>,
    pub team1_flag: Option<String>,
    pub team2_flag: Option<String>,
    pub result: Option<String>,
    pub match_url: Option<String>,
    /// Local series row, when the series is known.
    pub series_ref: Option<i32>,
    pub batting_data: Option<serde_json::Value>,
    pub bowling_data: Option<serde_json::Value>,
    pub innings_data: Option<serde_json::Value>,
    pub toss: Option<String>,
    pub live_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
