//! Diesel row types and their conversions to domain models.
//!
//! Timestamps are stored as RFC 3339 text and JSON columns as text; both are
//! decoded leniently so a malformed cell never fails a whole read.

use diesel::prelude::*;

use super::{parse_datetime, parse_datetime_opt};
use crate::models::{
    Category, CategorySchedule, LiveScoreScrapeSetting, LogStatus, Match, MatchScrapeSetting,
    MatchState, Player, ScrapeLog, ScrapeSetting, Series, Team,
};
use crate::schema;

fn json_opt<T: serde::de::DeserializeOwned>(text: Option<String>) -> Option<T> {
    text.and_then(|t| serde_json::from_str(&t).ok())
}

#[derive(Queryable, Debug, Clone)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategoryRecord {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub url: String,
    pub created_at: String,
}

impl From<CategoryRecord> for Category {
    fn from(r: CategoryRecord) -> Self {
        Category {
            id: r.id,
            name: r.name,
            slug: r.slug,
            url: r.url,
            created_at: parse_datetime(&r.created_at),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::teams)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TeamRecord {
    pub id: i32,
    pub team_id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub flag_url: Option<String>,
    pub team_url: Option<String>,
    pub category_id: i32,
    pub slug: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TeamRecord> for Team {
    fn from(r: TeamRecord) -> Self {
        Team {
            id: r.id,
            team_id: r.team_id,
            name: r.name,
            short_name: r.short_name,
            flag_url: r.flag_url,
            team_url: r.team_url,
            category_id: r.category_id,
            slug: r.slug,
            created_at: parse_datetime(&r.created_at),
            updated_at: parse_datetime(&r.updated_at),
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::teams)]
pub struct NewTeam<'a> {
    pub team_id: &'a str,
    pub name: &'a str,
    pub short_name: Option<&'a str>,
    pub flag_url: Option<&'a str>,
    pub team_url: Option<&'a str>,
    pub category_id: i32,
    pub slug: Option<&'a str>,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Team update. `None` leaves the stored column untouched.
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = schema::teams)]
pub struct TeamChanges<'a> {
    pub name: Option<&'a str>,
    pub short_name: Option<&'a str>,
    pub flag_url: Option<&'a str>,
    pub team_url: Option<&'a str>,
    pub category_id: Option<i32>,
    pub slug: Option<&'a str>,
    pub updated_at: Option<&'a str>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::players)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PlayerRecord {
    pub id: i32,
    pub player_id: String,
    pub name: String,
    pub role: Option<String>,
    pub photo_url: Option<String>,
    pub player_url: Option<String>,
    pub team_id: i32,
    pub slug: Option<String>,
    pub born: Option<String>,
    pub birth_place: Option<String>,
    pub nickname: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub legacy_stats: String,
    pub batting_stats: Option<String>,
    pub bowling_stats: Option<String>,
    pub career_timeline: Option<String>,
    pub profile_scraped: bool,
    pub profile_scraped_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PlayerRecord> for Player {
    fn from(r: PlayerRecord) -> Self {
        Player {
            id: r.id,
            player_id: r.player_id,
            name: r.name,
            role: r.role,
            photo_url: r.photo_url,
            player_url: r.player_url,
            team_id: r.team_id,
            slug: r.slug,
            born: r.born,
            birth_place: r.birth_place,
            nickname: r.nickname,
            batting_style: r.batting_style,
            bowling_style: r.bowling_style,
            legacy: serde_json::from_str(&r.legacy_stats).unwrap_or_default(),
            batting_stats: json_opt(r.batting_stats),
            bowling_stats: json_opt(r.bowling_stats),
            career_timeline: json_opt(r.career_timeline),
            profile_scraped: r.profile_scraped,
            profile_scraped_at: parse_datetime_opt(r.profile_scraped_at),
            created_at: parse_datetime(&r.created_at),
            updated_at: parse_datetime(&r.updated_at),
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::players)]
pub struct NewPlayer<'a> {
    pub player_id: &'a str,
    pub name: &'a str,
    pub role: Option<&'a str>,
    pub photo_url: Option<&'a str>,
    pub player_url: Option<&'a str>,
    pub team_id: i32,
    pub slug: Option<&'a str>,
    pub legacy_stats: &'a str,
    pub profile_scraped: bool,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Roster-level player update. Profile columns are never touched here.
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = schema::players)]
pub struct PlayerChanges<'a> {
    pub name: Option<&'a str>,
    pub role: Option<&'a str>,
    pub photo_url: Option<&'a str>,
    pub player_url: Option<&'a str>,
    pub team_id: Option<i32>,
    pub slug: Option<&'a str>,
    pub updated_at: Option<&'a str>,
}

/// Profile enrichment written by the profile scrape only.
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = schema::players)]
pub struct ProfileChanges {
    pub born: Option<String>,
    pub birth_place: Option<String>,
    pub nickname: Option<String>,
    pub role: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub legacy_stats: Option<String>,
    pub batting_stats: Option<String>,
    pub bowling_stats: Option<String>,
    pub career_timeline: Option<String>,
    pub profile_scraped: Option<bool>,
    pub profile_scraped_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::series)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SeriesRecord {
    pub id: i32,
    pub series_id: String,
    pub name: String,
    pub series_url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub date_range: Option<String>,
    pub category_id: Option<i32>,
    pub slug: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SeriesRecord> for Series {
    fn from(r: SeriesRecord) -> Self {
        Series {
            id: r.id,
            series_id: r.series_id,
            name: r.name,
            series_url: r.series_url,
            start_date: r.start_date,
            end_date: r.end_date,
            date_range: r.date_range,
            category_id: r.category_id,
            slug: r.slug,
            created_at: parse_datetime(&r.created_at),
            updated_at: parse_datetime(&r.updated_at),
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::series)]
pub struct NewSeries<'a> {
    pub series_id: &'a str,
    pub name: &'a str,
    pub series_url: Option<&'a str>,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
    pub date_range: Option<&'a str>,
    pub category_id: Option<i32>,
    pub slug: Option<&'a str>,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = schema::series)]
pub struct SeriesChanges<'a> {
    pub name: Option<&'a str>,
    pub series_url: Option<&'a str>,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
    pub date_range: Option<&'a str>,
    pub category_id: Option<i32>,
    pub slug: Option<&'a str>,
    pub updated_at: Option<&'a str>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::matches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MatchRecord {
    pub id: i32,
    pub match_id: String,
    pub series_id: Option<String>,
    pub team1_id: Option<String>,
    pub team2_id: Option<String>,
    pub venue_id: Option<String>,
    pub match_desc: Option<String>,
    pub match_format: Option<String>,
    pub venue: Option<String>,
    pub match_date: Option<String>,
    pub state: String,
    pub team1_name: Option<String>,
    pub team2_name: Option<String>,
    pub team1_score: Option<String>,
    pub team2_score: Option<String>,
    pub team1_flag: Option<String>,
    pub team2_flag: Option<String>,
    pub result: Option<String>,
    pub match_url: Option<String>,
    pub series_ref: Option<i32>,
    pub batting_data: Option<String>,
    pub bowling_data: Option<String>,
    pub innings_data: Option<String>,
    pub toss: Option<String>,
    pub live_status: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<MatchRecord> for Match {
    fn from(r: MatchRecord) -> Self {
        Match {
            id: r.id,
            match_id: r.match_id,
            series_id: r.series_id,
            team1_id: r.team1_id,
            team2_id: r.team2_id,
            venue_id: r.venue_id,
            match_desc: r.match_desc,
            match_format: r.match_format,
            venue: r.venue,
            match_date: r.match_date,
            state: MatchState::from_str(&r.state).unwrap_or_else(|| MatchState::normalize(&r.state)),
            team1_name: r.team1_name,
            team2_name: r.team2_name,
            team1_score: r.team1_score,
            team2_score: r.team2_score,
            team1_flag: r.team1_flag,
            team2_flag: r.team2_flag,
            result: r.result,
            match_url: r.match_url,
            series_ref: r.series_ref,
            batting_data: json_opt(r.batting_data),
            bowling_data: json_opt(r.bowling_data),
            innings_data: json_opt(r.innings_data),
            toss: r.toss,
            live_status: r.live_status,
            created_at: parse_datetime(&r.created_at),
            updated_at: parse_datetime(&r.updated_at),
        }
    }
}

/// A match row ready for insertion.
#[derive(Insertable, Debug, Default)]
#[diesel(table_name = schema::matches)]
pub struct NewMatch {
    pub match_id: String,
    pub series_id: Option<String>,
    pub team1_id: Option<String>,
    pub team2_id: Option<String>,
    pub venue_id: Option<String>,
    pub match_desc: Option<String>,
    pub match_format: Option<String>,
    pub venue: Option<String>,
    pub match_date: Option<String>,
    pub state: String,
    pub team1_name: Option<String>,
    pub team2_name: Option<String>,
    pub team1_score: Option<String>,
    pub team2_score: Option<String>,
    pub team1_flag: Option<String>,
    pub team2_flag: Option<String>,
    pub result: Option<String>,
    pub match_url: Option<String>,
    pub series_ref: Option<i32>,
    pub batting_data: Option<String>,
    pub bowling_data: Option<String>,
    pub innings_data: Option<String>,
    pub toss: Option<String>,
    pub live_status: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Match update. `None` leaves the stored column untouched.
#[derive(AsChangeset, Debug, Default, PartialEq)]
#[diesel(table_name = schema::matches)]
pub struct MatchChanges {
    pub series_id: Option<String>,
    pub team1_id: Option<String>,
    pub team2_id: Option<String>,
    pub venue_id: Option<String>,
    pub match_desc: Option<String>,
    pub match_format: Option<String>,
    pub venue: Option<String>,
    pub match_date: Option<String>,
    pub state: Option<String>,
    pub team1_name: Option<String>,
    pub team2_name: Option<String>,
    pub team1_score: Option<String>,
    pub team2_score: Option<String>,
    pub team1_flag: Option<String>,
    pub team2_flag: Option<String>,
    pub result: Option<String>,
    pub match_url: Option<String>,
    pub series_ref: Option<i32>,
    pub batting_data: Option<String>,
    pub bowling_data: Option<String>,
    pub innings_data: Option<String>,
    pub toss: Option<String>,
    pub live_status: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::scrape_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ScrapeLogRecord {
    pub id: i32,
    pub category: Option<String>,
    pub status: String,
    pub message: Option<String>,
    pub teams_scraped: i32,
    pub players_scraped: i32,
    pub created_at: String,
}

impl From<ScrapeLogRecord> for ScrapeLog {
    fn from(r: ScrapeLogRecord) -> Self {
        ScrapeLog {
            id: r.id,
            category: r.category,
            status: LogStatus::from_str(&r.status).unwrap_or(LogStatus::Error),
            message: r.message,
            teams_scraped: r.teams_scraped,
            players_scraped: r.players_scraped,
            created_at: parse_datetime(&r.created_at),
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::scrape_logs)]
pub struct NewScrapeLog<'a> {
    pub category: Option<&'a str>,
    pub status: &'a str,
    pub message: Option<&'a str>,
    pub teams_scraped: i32,
    pub players_scraped: i32,
    pub created_at: &'a str,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::scrape_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ScrapeSettingRecord {
    pub id: i32,
    pub auto_scrape_enabled: bool,
    pub scrape_time: String,
    pub last_scrape: Option<String>,
    pub player_auto_scrape_enabled: bool,
    pub player_scrape_time: String,
    pub last_player_scrape: Option<String>,
    pub intl_auto: bool,
    pub intl_time: String,
    pub domestic_auto: bool,
    pub domestic_time: String,
    pub league_auto: bool,
    pub league_time: String,
    pub women_auto: bool,
    pub women_time: String,
    pub updated_at: String,
}

impl From<ScrapeSettingRecord> for ScrapeSetting {
    fn from(r: ScrapeSettingRecord) -> Self {
        ScrapeSetting {
            id: r.id,
            auto_scrape_enabled: r.auto_scrape_enabled,
            scrape_time: r.scrape_time,
            last_scrape: parse_datetime_opt(r.last_scrape),
            player_auto_scrape_enabled: r.player_auto_scrape_enabled,
            player_scrape_time: r.player_scrape_time,
            last_player_scrape: parse_datetime_opt(r.last_player_scrape),
            intl_auto: r.intl_auto,
            intl_time: r.intl_time,
            domestic_auto: r.domestic_auto,
            domestic_time: r.domestic_time,
            league_auto: r.league_auto,
            league_time: r.league_time,
            women_auto: r.women_auto,
            women_time: r.women_time,
            updated_at: parse_datetime(&r.updated_at),
        }
    }
}

/// Row shape shared by the per-category profile and series schedules.
#[derive(Queryable, Debug, Clone)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategoryScheduleRecord {
    pub id: i32,
    pub category_slug: String,
    pub auto_scrape_enabled: bool,
    pub scrape_time: String,
    pub last_scrape: Option<String>,
    pub updated_at: String,
}

impl From<CategoryScheduleRecord> for CategorySchedule {
    fn from(r: CategoryScheduleRecord) -> Self {
        CategorySchedule {
            id: r.id,
            category_slug: r.category_slug,
            auto_scrape_enabled: r.auto_scrape_enabled,
            scrape_time: r.scrape_time,
            last_scrape: parse_datetime_opt(r.last_scrape),
            updated_at: parse_datetime(&r.updated_at),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::match_scrape_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MatchScrapeSettingRecord {
    pub id: i32,
    pub auto_scrape_enabled: bool,
    pub interval_hours: i32,
    pub last_scrape: Option<String>,
    pub updated_at: String,
}

impl From<MatchScrapeSettingRecord> for MatchScrapeSetting {
    fn from(r: MatchScrapeSettingRecord) -> Self {
        MatchScrapeSetting {
            id: r.id,
            auto_scrape_enabled: r.auto_scrape_enabled,
            interval_hours: r.interval_hours,
            last_scrape: parse_datetime_opt(r.last_scrape),
            updated_at: parse_datetime(&r.updated_at),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::live_score_scrape_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LiveScoreScrapeSettingRecord {
    pub id: i32,
    pub auto_scrape_enabled: bool,
    pub interval_seconds: i32,
    pub last_scrape: Option<String>,
    pub updated_at: String,
}

impl From<LiveScoreScrapeSettingRecord> for LiveScoreScrapeSetting {
    fn from(r: LiveScoreScrapeSettingRecord) -> Self {
        LiveScoreScrapeSetting {
            id: r.id,
            auto_scrape_enabled: r.auto_scrape_enabled,
            interval_seconds: r.interval_seconds,
            last_scrape: parse_datetime_opt(r.last_scrape),
            updated_at: parse_datetime(&r.updated_at),
        }
    }
}
