//! Player models, including per-format career statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Formats tracked in the structured statistics, in column order.
pub const FORMATS: [&str; 4] = ["test", "odi", "t20", "ipl"];

/// Statistics keyed by format, then by normalized stat name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatStats {
    #[serde(default)]
    pub test: BTreeMap<String, String>,
    #[serde(default)]
    pub odi: BTreeMap<String, String>,
    #[serde(default)]
    pub t20: BTreeMap<String, String>,
    #[serde(default)]
    pub ipl: BTreeMap<String, String>,
}

impl FormatStats {
    pub fn get(&self, format: &str) -> Option<&BTreeMap<String, String>> {
        match format {
            "test" => Some(&self.test),
            "odi" => Some(&self.odi),
            "t20" => Some(&self.t20),
            "ipl" => Some(&self.ipl),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, format: &str) -> Option<&mut BTreeMap<String, String>> {
        match format {
            "test" => Some(&mut self.test),
            "odi" => Some(&mut self.odi),
            "t20" => Some(&mut self.t20),
            "ipl" => Some(&mut self.ipl),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.test.is_empty() && self.odi.is_empty() && self.t20.is_empty() && self.ipl.is_empty()
    }
}

/// Debut and most recent appearance in one format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerSpan {
    pub debut: String,
    pub last_match: String,
}

/// Career timeline keyed by lowercase format name.
pub type CareerTimeline = BTreeMap<String, CareerSpan>;

/// Flat ODI batting figures kept for older consumers of the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyBatting {
    pub bat_matches: Option<String>,
    pub bat_innings: Option<String>,
    pub bat_runs: Option<String>,
    pub bat_balls: Option<String>,
    pub bat_highest: Option<String>,
    pub bat_average: Option<String>,
    pub bat_strike_rate: Option<String>,
    pub bat_not_outs: Option<String>,
    pub bat_fours: Option<String>,
    pub bat_sixes: Option<String>,
    pub bat_ducks: Option<String>,
    pub bat_fifties: Option<String>,
    pub bat_hundreds: Option<String>,
    pub bat_two_hundreds: Option<String>,
}

impl LegacyBatting {
    /// Set the field matching a normalized batting stat name.
    /// Returns false when the stat has no flat counterpart.
    pub fn set(&mut self, stat: &str, value: String) -> bool {
        let slot = match stat {
            "matches" => &mut self.bat_matches,
            "innings" => &mut self.bat_innings,
            "runs" => &mut self.bat_runs,
            "balls" => &mut self.bat_balls,
            "highest" => &mut self.bat_highest,
            "average" => &mut self.bat_average,
            "strike rate" => &mut self.bat_strike_rate,
            "not outs" => &mut self.bat_not_outs,
            "fours" => &mut self.bat_fours,
            "sixes" => &mut self.bat_sixes,
            "ducks" => &mut self.bat_ducks,
            "50s" => &mut self.bat_fifties,
            "100s" => &mut self.bat_hundreds,
            "200s" => &mut self.bat_two_hundreds,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// Flat ODI bowling figures kept for older consumers of the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyBowling {
    pub bowl_matches: Option<String>,
    pub bowl_innings: Option<String>,
    pub bowl_balls: Option<String>,
    pub bowl_runs: Option<String>,
    pub bowl_maidens: Option<String>,
    pub bowl_wickets: Option<String>,
    pub bowl_average: Option<String>,
    pub bowl_economy: Option<String>,
    pub bowl_strike_rate: Option<String>,
    pub bowl_best_innings: Option<String>,
    pub bowl_best_match: Option<String>,
    pub bowl_four_wickets: Option<String>,
    pub bowl_five_wickets: Option<String>,
    pub bowl_ten_wickets: Option<String>,
}

impl LegacyBowling {
    /// Set the field matching a normalized bowling stat name.
    /// Returns false when the stat has no flat counterpart.
    pub fn set(&mut self, stat: &str, value: String) -> bool {
        let slot = match stat {
            "matches" => &mut self.bowl_matches,
            "innings" => &mut self.bowl_innings,
            "balls" => &mut self.bowl_balls,
            "runs" => &mut self.bowl_runs,
            "maidens" => &mut self.bowl_maidens,
            "wickets" => &mut self.bowl_wickets,
            "average" => &mut self.bowl_average,
            "economy" => &mut self.bowl_economy,
            "strike rate" => &mut self.bowl_strike_rate,
            "bbi" => &mut self.bowl_best_innings,
            "bbm" => &mut self.bowl_best_match,
            "4w" => &mut self.bowl_four_wickets,
            "5w" => &mut self.bowl_five_wickets,
            "10w" => &mut self.bowl_ten_wickets,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// Flat ODI statistics, stored as one JSON column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyStats {
    #[serde(flatten)]
    pub batting: LegacyBatting,
    #[serde(flatten)]
    pub bowling: LegacyBowling,
}

impl LegacyStats {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A player as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: i32,
    /// Provider player id.
    pub player_id: String,
    pub name: String,
    pub role: Option<String>,
    pub photo_url: Option<String>,
    pub player_url: Option<String>,
    /// Local id of the team this player was listed under.
    pub team_id: i32,
    pub slug: Option<String>,

    // Profile enrichment
    pub born: Option<String>,
    pub birth_place: Option<String>,
    pub nickname: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub legacy: LegacyStats,
    pub batting_stats: Option<FormatStats>,
    pub bowling_stats: Option<FormatStats>,
    pub career_timeline: Option<CareerTimeline>,
    pub profile_scraped: bool,
    pub profile_scraped_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
