//! Typed parser outputs.
//!
//! Every record carries the provider id it was extracted with. Optional
//! fields are `None` when the page did not present them; the upserter's
//! merge rules rely on that distinction.

use serde::{Deserialize, Serialize};

use crate::models::{CareerTimeline, FormatStats, LegacyStats, MatchState};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRec {
    pub team_id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub team_url: Option<String>,
    pub flag_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRec {
    pub player_id: String,
    pub name: String,
    pub player_url: Option<String>,
    pub photo_url: Option<String>,
    pub role: Option<String>,
}

/// Profile enrichment for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRec {
    pub born: Option<String>,
    pub birth_place: Option<String>,
    pub nickname: Option<String>,
    pub role: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub batting_stats: FormatStats,
    pub bowling_stats: FormatStats,
    pub legacy: LegacyStats,
    pub career_timeline: CareerTimeline,
}

impl ProfileRec {
    /// Whether the page yielded anything at all.
    pub fn is_empty(&self) -> bool {
        self.born.is_none()
            && self.birth_place.is_none()
            && self.nickname.is_none()
            && self.role.is_none()
            && self.batting_style.is_none()
            && self.bowling_style.is_none()
            && self.batting_stats.is_empty()
            && self.bowling_stats.is_empty()
            && self.career_timeline.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRec {
    pub series_id: String,
    pub name: String,
    pub series_url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub date_range: Option<String>,
    /// Month-year group the listing placed the series under.
    pub month_label: Option<String>,
}

/// One match as extracted from a series page, the live board, or a
/// scorecard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRec {
    pub match_id: String,
    pub series_id: Option<String>,
    pub series_name: Option<String>,
    pub team1_id: Option<String>,
    pub team2_id: Option<String>,
    pub venue_id: Option<String>,
    pub match_desc: Option<String>,
    pub match_format: Option<String>,
    pub venue: Option<String>,
    pub match_date: Option<String>,
    /// `None` when the source page says nothing about state.
    pub state: Option<MatchState>,
    /// Upstream status line, e.g. "India won by 5 wkts".
    pub status: Option<String>,
    pub team1_name: Option<String>,
    pub team2_name: Option<String>,
    pub team1_short: Option<String>,
    pub team2_short: Option<String>,
    /// Score as "R/W (O)"; empty when unknown or not trustworthy.
    pub team1_score: String,
    pub team2_score: String,
    pub team1_flag: Option<String>,
    pub team2_flag: Option<String>,
    pub result: Option<String>,
    pub match_url: Option<String>,
    pub toss: Option<String>,
    pub batting_data: Option<serde_json::Value>,
    pub bowling_data: Option<serde_json::Value>,
    pub innings_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatterRow {
    pub name: String,
    pub dismissal: String,
    pub runs: String,
    pub balls: String,
    pub fours: String,
    pub sixes: String,
    pub strike_rate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlerRow {
    pub name: String,
    pub overs: String,
    pub maidens: String,
    pub runs: String,
    pub wickets: String,
    pub economy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsRec {
    pub innings_num: u32,
    pub team_name: String,
    /// "R/W"
    pub total_score: String,
    pub overs: String,
    pub batting: Vec<BatterRow>,
    pub bowling: Vec<BowlerRow>,
    pub extras: Option<String>,
    pub fall_of_wickets: Vec<String>,
}

impl InningsRec {
    /// Total as "R/W (O)", matching the series-page score format.
    pub fn score_line(&self) -> String {
        match (self.total_score.is_empty(), self.overs.is_empty()) {
            (true, _) => String::new(),
            (false, true) => self.total_score.clone(),
            (false, false) => format!("{} ({})", self.total_score, self.overs),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorecardRec {
    pub match_id: String,
    pub series_id: Option<String>,
    pub team1_id: Option<String>,
    pub team2_id: Option<String>,
    pub venue_id: Option<String>,
    pub venue: Option<String>,
    pub match_date: Option<String>,
    pub result: Option<String>,
    pub toss: Option<String>,
    pub innings: Vec<InningsRec>,
}

impl ScorecardRec {
    /// Fold the scorecard into a match update.
    ///
    /// Scores come from each team's latest innings. State is only asserted
    /// when a result is present.
    pub fn to_match_rec(&self) -> MatchRec {
        let mut rec = MatchRec {
            match_id: self.match_id.clone(),
            series_id: self.series_id.clone(),
            team1_id: self.team1_id.clone(),
            team2_id: self.team2_id.clone(),
            venue_id: self.venue_id.clone(),
            venue: self.venue.clone(),
            match_date: self.match_date.clone(),
            result: self.result.clone(),
            toss: self.toss.clone(),
            state: self.result.as_ref().map(|_| MatchState::Complete),
            ..Default::default()
        };

        let first_team = self.innings.first().map(|i| i.team_name.clone());
        for innings in &self.innings {
            let line = innings.score_line();
            if line.is_empty() {
                continue;
            }
            if Some(&innings.team_name) == first_team.as_ref() {
                rec.team1_name = Some(innings.team_name.clone());
                rec.team1_score = line;
            } else {
                rec.team2_name = Some(innings.team_name.clone());
                rec.team2_score = line;
            }
        }

        if !self.innings.is_empty() {
            let batting: Vec<_> = self
                .innings
                .iter()
                .map(|i| serde_json::json!({ "innings": i.innings_num, "team": i.team_name, "rows": i.batting }))
                .collect();
            let bowling: Vec<_> = self
                .innings
                .iter()
                .map(|i| serde_json::json!({ "innings": i.innings_num, "team": i.team_name, "rows": i.bowling }))
                .collect();
            rec.batting_data = Some(serde_json::Value::Array(batting));
            rec.bowling_data = Some(serde_json::Value::Array(bowling));
            rec.innings_data = serde_json::to_value(&self.innings).ok();
        }

        rec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn innings(num: u32, team: &str, total: &str, overs: &str) -> InningsRec {
        InningsRec {
            innings_num: num,
            team_name: team.into(),
            total_score: total.into(),
            overs: overs.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_scorecard_to_match() {
        let card = ScorecardRec {
            match_id: "42".into(),
            result: Some("India won by 5 wkts".into()),
            innings: vec![
                innings(1, "Australia", "250/9", "50"),
                innings(2, "India", "251/5", "47.2"),
            ],
            ..Default::default()
        };
        let rec = card.to_match_rec();
        assert_eq!(rec.team1_name.as_deref(), Some("Australia"));
        assert_eq!(rec.team1_score, "250/9 (50)");
        assert_eq!(rec.team2_score, "251/5 (47.2)");
        assert_eq!(rec.state, Some(MatchState::Complete));
        assert!(rec.innings_data.is_some());
    }

    #[test]
    fn test_scorecard_without_result_keeps_state_open() {
        let card = ScorecardRec {
            match_id: "42".into(),
            innings: vec![innings(1, "India", "120/2", "20.1")],
            ..Default::default()
        };
        let rec = card.to_match_rec();
        assert_eq!(rec.state, None);
        assert_eq!(rec.team2_score, "");
    }
}
