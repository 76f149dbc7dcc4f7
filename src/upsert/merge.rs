//! Merge rules between a fresh scrape and stored rows.
//!
//! Every rule is the same at heart: a non-empty fresh value overwrites, an
//! empty or absent one leaves the stored column alone. Changesets express
//! that directly since `None` fields are skipped by diesel.

use crate::models::MatchState;
use crate::normalize::SlugAllocator;
use crate::repository::models::{
    MatchChanges, NewMatch, NewPlayer, NewSeries, NewTeam, PlayerChanges, ProfileChanges,
    SeriesChanges, TeamChanges,
};
use crate::scrapers::records::{MatchRec, PlayerRec, ProfileRec, SeriesRec, TeamRec};

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn present_owned(value: &Option<String>) -> Option<String> {
    present(value).map(str::to_string)
}

fn present_str(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty()).then(|| v.to_string())
}

fn json_text(value: &Option<serde_json::Value>) -> Option<String> {
    value
        .as_ref()
        .filter(|v| !v.is_null())
        .map(|v| v.to_string())
}

/// A slug for a row that lacks one. Rows that already have a slug keep it.
pub fn slug_for(
    stored: Option<&str>,
    name: &str,
    fallback: &str,
    slugs: &mut SlugAllocator,
) -> Option<String> {
    match stored.filter(|s| !s.is_empty()) {
        Some(_) => None,
        None => Some(slugs.allocate(name, fallback)),
    }
}

pub fn new_team<'a>(
    fresh: &'a TeamRec,
    category_id: i32,
    slug: Option<&'a str>,
    now: &'a str,
) -> NewTeam<'a> {
    NewTeam {
        team_id: &fresh.team_id,
        name: fresh.name.trim(),
        short_name: present(&fresh.short_name),
        flag_url: present(&fresh.flag_url),
        team_url: present(&fresh.team_url),
        category_id,
        slug,
        created_at: now,
        updated_at: now,
    }
}

pub fn team_changes<'a>(
    fresh: &'a TeamRec,
    category_id: i32,
    slug: Option<&'a str>,
    now: &'a str,
) -> TeamChanges<'a> {
    TeamChanges {
        name: Some(fresh.name.trim()).filter(|n| !n.is_empty()),
        short_name: present(&fresh.short_name),
        flag_url: present(&fresh.flag_url),
        team_url: present(&fresh.team_url),
        category_id: Some(category_id),
        slug,
        updated_at: Some(now),
    }
}

pub fn new_player<'a>(
    fresh: &'a PlayerRec,
    team_id: i32,
    slug: Option<&'a str>,
    now: &'a str,
) -> NewPlayer<'a> {
    NewPlayer {
        player_id: &fresh.player_id,
        name: fresh.name.trim(),
        role: present(&fresh.role),
        photo_url: present(&fresh.photo_url),
        player_url: present(&fresh.player_url),
        team_id,
        slug,
        legacy_stats: "{}",
        profile_scraped: false,
        created_at: now,
        updated_at: now,
    }
}

/// Roster update. Profile columns are absent from the changeset, so a
/// roster scrape can never clear enrichment.
pub fn player_changes<'a>(
    fresh: &'a PlayerRec,
    team_id: i32,
    slug: Option<&'a str>,
    now: &'a str,
) -> PlayerChanges<'a> {
    PlayerChanges {
        name: Some(fresh.name.trim()).filter(|n| !n.is_empty()),
        role: present(&fresh.role),
        photo_url: present(&fresh.photo_url),
        player_url: present(&fresh.player_url),
        team_id: Some(team_id),
        slug,
        updated_at: Some(now),
    }
}

/// Profile enrichment. Sections the page did not yield keep their stored
/// values; the scraped flag is always set.
pub fn profile_changes(fresh: &ProfileRec, now: &str) -> ProfileChanges {
    ProfileChanges {
        born: present_owned(&fresh.born),
        birth_place: present_owned(&fresh.birth_place),
        nickname: present_owned(&fresh.nickname),
        role: present_owned(&fresh.role),
        batting_style: present_owned(&fresh.batting_style),
        bowling_style: present_owned(&fresh.bowling_style),
        legacy_stats: (!fresh.legacy.is_empty())
            .then(|| serde_json::to_string(&fresh.legacy).ok())
            .flatten(),
        batting_stats: (!fresh.batting_stats.is_empty())
            .then(|| serde_json::to_string(&fresh.batting_stats).ok())
            .flatten(),
        bowling_stats: (!fresh.bowling_stats.is_empty())
            .then(|| serde_json::to_string(&fresh.bowling_stats).ok())
            .flatten(),
        career_timeline: (!fresh.career_timeline.is_empty())
            .then(|| serde_json::to_string(&fresh.career_timeline).ok())
            .flatten(),
        profile_scraped: Some(true),
        profile_scraped_at: Some(now.to_string()),
        updated_at: Some(now.to_string()),
    }
}

pub fn new_series<'a>(
    fresh: &'a SeriesRec,
    category_id: Option<i32>,
    slug: Option<&'a str>,
    now: &'a str,
) -> NewSeries<'a> {
    NewSeries {
        series_id: &fresh.series_id,
        name: fresh.name.trim(),
        series_url: present(&fresh.series_url),
        start_date: present(&fresh.start_date),
        end_date: present(&fresh.end_date),
        date_range: present(&fresh.date_range),
        category_id,
        slug,
        created_at: now,
        updated_at: now,
    }
}

/// Series update. A listing under the catch-all category passes `None` so
/// a more specific category is not overwritten.
pub fn series_changes<'a>(
    fresh: &'a SeriesRec,
    category_id: Option<i32>,
    slug: Option<&'a str>,
    now: &'a str,
) -> SeriesChanges<'a> {
    SeriesChanges {
        name: Some(fresh.name.trim()).filter(|n| !n.is_empty()),
        series_url: present(&fresh.series_url),
        start_date: present(&fresh.start_date),
        end_date: present(&fresh.end_date),
        date_range: present(&fresh.date_range),
        category_id,
        slug,
        updated_at: Some(now),
    }
}

pub fn new_match(fresh: &MatchRec, series_ref: Option<i32>, now: &str) -> NewMatch {
    let changes = match_changes(fresh, series_ref, now);
    NewMatch {
        match_id: fresh.match_id.clone(),
        series_id: changes.series_id,
        team1_id: changes.team1_id,
        team2_id: changes.team2_id,
        venue_id: changes.venue_id,
        match_desc: changes.match_desc,
        match_format: changes.match_format,
        venue: changes.venue,
        match_date: changes.match_date,
        state: changes
            .state
            .unwrap_or_else(|| MatchState::default().as_str().to_string()),
        team1_name: changes.team1_name,
        team2_name: changes.team2_name,
        team1_score: changes.team1_score,
        team2_score: changes.team2_score,
        team1_flag: changes.team1_flag,
        team2_flag: changes.team2_flag,
        result: changes.result,
        match_url: changes.match_url,
        series_ref: changes.series_ref,
        batting_data: changes.batting_data,
        bowling_data: changes.bowling_data,
        innings_data: changes.innings_data,
        toss: changes.toss,
        live_status: changes.live_status,
        created_at: now.to_string(),
        updated_at: now.to_string(),
    }
}

/// Match update.
///
/// Scores and result follow the preserve-if-missing rule: an empty fresh
/// value never replaces a stored one. State is written whenever the page
/// asserted one. A supplied series ref replaces the stored one.
pub fn match_changes(fresh: &MatchRec, series_ref: Option<i32>, now: &str) -> MatchChanges {
    MatchChanges {
        series_id: present_owned(&fresh.series_id),
        team1_id: present_owned(&fresh.team1_id),
        team2_id: present_owned(&fresh.team2_id),
        venue_id: present_owned(&fresh.venue_id),
        match_desc: present_owned(&fresh.match_desc),
        match_format: present_owned(&fresh.match_format),
        venue: present_owned(&fresh.venue),
        match_date: present_owned(&fresh.match_date),
        state: fresh.state.map(|s| s.as_str().to_string()),
        team1_name: present_owned(&fresh.team1_name),
        team2_name: present_owned(&fresh.team2_name),
        team1_score: present_str(&fresh.team1_score),
        team2_score: present_str(&fresh.team2_score),
        team1_flag: present_owned(&fresh.team1_flag),
        team2_flag: present_owned(&fresh.team2_flag),
        result: present_owned(&fresh.result),
        match_url: present_owned(&fresh.match_url),
        series_ref,
        batting_data: json_text(&fresh.batting_data),
        bowling_data: json_text(&fresh.bowling_data),
        innings_data: json_text(&fresh.innings_data),
        toss: present_owned(&fresh.toss),
        live_status: present_owned(&fresh.status),
        updated_at: Some(now.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: &str = "2026-01-01T00:00:00+00:00";

    #[test]
    fn test_empty_scores_are_not_written() {
        let fresh = MatchRec {
            match_id: "42".into(),
            team1_score: "".into(),
            team2_score: "  ".into(),
            result: Some(String::new()),
            ..Default::default()
        };
        let changes = match_changes(&fresh, None, NOW);
        assert_eq!(changes.team1_score, None);
        assert_eq!(changes.team2_score, None);
        assert_eq!(changes.result, None);
        assert_eq!(changes.state, None);
        assert_eq!(changes.series_ref, None);
    }

    #[test]
    fn test_state_and_scores_written() {
        let fresh = MatchRec {
            match_id: "42".into(),
            state: Some(MatchState::InningsBreak),
            team1_score: "200/4 (30)".into(),
            status: Some("Innings Break".into()),
            batting_data: Some(serde_json::Value::Null),
            bowling_data: Some(serde_json::json!([{"innings": 1}])),
            ..Default::default()
        };
        let changes = match_changes(&fresh, Some(7), NOW);
        assert_eq!(changes.state.as_deref(), Some("Innings Break"));
        assert_eq!(changes.team1_score.as_deref(), Some("200/4 (30)"));
        assert_eq!(changes.series_ref, Some(7));
        assert_eq!(changes.batting_data, None);
        assert!(changes.bowling_data.is_some());
        assert_eq!(changes.live_status.as_deref(), Some("Innings Break"));
    }

    #[test]
    fn test_new_match_defaults_to_upcoming() {
        let fresh = MatchRec {
            match_id: "42".into(),
            ..Default::default()
        };
        let row = new_match(&fresh, None, NOW);
        assert_eq!(row.state, "Upcoming");
        assert_eq!(row.match_id, "42");
        assert_eq!(row.team1_score, None);
    }

    #[test]
    fn test_slug_only_when_missing() {
        let mut slugs = SlugAllocator::new(["india"]);
        assert_eq!(slug_for(Some("india"), "India", "2", &mut slugs), None);
        assert_eq!(
            slug_for(None, "India", "2", &mut slugs).as_deref(),
            Some("india-1")
        );
        assert_eq!(slug_for(Some(""), "???", "77", &mut slugs).as_deref(), Some("77"));
    }

    #[test]
    fn test_profile_changes_keep_missing_sections() {
        let mut fresh = ProfileRec {
            born: Some("Nov 05, 1988".into()),
            ..Default::default()
        };
        fresh
            .batting_stats
            .odi
            .insert("average".into(), "57.3".into());
        let changes = profile_changes(&fresh, NOW);
        assert_eq!(changes.born.as_deref(), Some("Nov 05, 1988"));
        assert!(changes.batting_stats.unwrap().contains("57.3"));
        assert_eq!(changes.bowling_stats, None);
        assert_eq!(changes.legacy_stats, None);
        assert_eq!(changes.profile_scraped, Some(true));
    }

    #[test]
    fn test_roster_changes_ignore_blank_fields() {
        let fresh = PlayerRec {
            player_id: "1413".into(),
            name: "Virat Kohli".into(),
            role: Some(" ".into()),
            ..Default::default()
        };
        let changes = player_changes(&fresh, 3, None, NOW);
        assert_eq!(changes.role, None);
        assert_eq!(changes.name, Some("Virat Kohli"));
        assert_eq!(changes.team_id, Some(3));
    }
}
