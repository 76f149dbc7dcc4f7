//! Database context for managing connections and repository access.
//!
//! The DbContext is the primary entry point for all database operations.
//! It holds the connection pool, creates and seeds the schema, and hands out
//! the per-entity repositories.

use std::path::Path;

use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl, SimpleAsyncConnection};
use tracing::info;

use super::matches::MatchRepository;
use super::players::PlayerRepository;
use super::pool::{DbError, DbPool, SqliteConn};
use super::scrape_logs::ScrapeLogRepository;
use super::series::SeriesRepository;
use super::settings::SettingsRepository;
use super::teams::TeamRepository;
use super::now_text;
use crate::models::{MatchState, SERIES_CATEGORIES, TEAM_CATEGORIES};
use crate::schema::{
    live_score_scrape_settings, match_scrape_settings, matches, players, profile_scrape_settings,
    scrape_logs, scrape_settings, series, series_categories, series_scrape_settings,
    team_categories, teams,
};

/// Full SQLite schema. Provider ids carry unique indexes; players cascade
/// with their team.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS team_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL,
    url TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_team_categories_slug ON team_categories(slug);

CREATE TABLE IF NOT EXISTS teams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    team_id TEXT NOT NULL,
    name TEXT NOT NULL,
    short_name TEXT,
    flag_url TEXT,
    team_url TEXT,
    category_id INTEGER NOT NULL REFERENCES team_categories(id),
    slug TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_teams_team_id ON teams(team_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_teams_slug ON teams(slug);
CREATE INDEX IF NOT EXISTS idx_teams_category ON teams(category_id);

CREATE TABLE IF NOT EXISTS players (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id TEXT NOT NULL,
    name TEXT NOT NULL,
    role TEXT,
    photo_url TEXT,
    player_url TEXT,
    team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
    slug TEXT,
    born TEXT,
    birth_place TEXT,
    nickname TEXT,
    batting_style TEXT,
    bowling_style TEXT,
    legacy_stats TEXT NOT NULL DEFAULT '{}',
    batting_stats TEXT,
    bowling_stats TEXT,
    career_timeline TEXT,
    profile_scraped BOOLEAN NOT NULL DEFAULT 0,
    profile_scraped_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_players_player_id ON players(player_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_players_slug ON players(slug);
CREATE INDEX IF NOT EXISTS idx_players_team ON players(team_id);

CREATE TABLE IF NOT EXISTS series_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL,
    url TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_series_categories_slug ON series_categories(slug);

CREATE TABLE IF NOT EXISTS series (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    series_id TEXT NOT NULL,
    name TEXT NOT NULL,
    series_url TEXT,
    start_date TEXT,
    end_date TEXT,
    date_range TEXT,
    category_id INTEGER REFERENCES series_categories(id),
    slug TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_series_series_id ON series(series_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_series_slug ON series(slug);

CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    match_id TEXT NOT NULL,
    series_id TEXT,
    team1_id TEXT,
    team2_id TEXT,
    venue_id TEXT,
    match_desc TEXT,
    match_format TEXT,
    venue TEXT,
    match_date TEXT,
    state TEXT NOT NULL DEFAULT 'Upcoming'
        CHECK (state IN ('Live', 'Innings Break', 'Complete', 'Upcoming')),
    team1_name TEXT,
    team2_name TEXT,
    team1_score TEXT,
    team2_score TEXT,
    team1_flag TEXT,
    team2_flag TEXT,
    result TEXT,
    match_url TEXT,
    series_ref INTEGER REFERENCES series(id) ON DELETE SET NULL,
    batting_data TEXT,
    bowling_data TEXT,
    innings_data TEXT,
    toss TEXT,
    live_status TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_matches_match_id ON matches(match_id);
CREATE INDEX IF NOT EXISTS idx_matches_state ON matches(state);
CREATE INDEX IF NOT EXISTS idx_matches_series ON matches(series_id);

CREATE TABLE IF NOT EXISTS scrape_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT,
    status TEXT NOT NULL,
    message TEXT,
    teams_scraped INTEGER NOT NULL DEFAULT 0,
    players_scraped INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_scrape_logs_created ON scrape_logs(created_at);

CREATE TABLE IF NOT EXISTS scrape_settings (
    id INTEGER PRIMARY KEY,
    auto_scrape_enabled BOOLEAN NOT NULL DEFAULT 0,
    scrape_time TEXT NOT NULL DEFAULT '02:00',
    last_scrape TEXT,
    player_auto_scrape_enabled BOOLEAN NOT NULL DEFAULT 0,
    player_scrape_time TEXT NOT NULL DEFAULT '03:00',
    last_player_scrape TEXT,
    intl_auto BOOLEAN NOT NULL DEFAULT 0,
    intl_time TEXT NOT NULL DEFAULT '04:00',
    domestic_auto BOOLEAN NOT NULL DEFAULT 0,
    domestic_time TEXT NOT NULL DEFAULT '05:00',
    league_auto BOOLEAN NOT NULL DEFAULT 0,
    league_time TEXT NOT NULL DEFAULT '06:00',
    women_auto BOOLEAN NOT NULL DEFAULT 0,
    women_time TEXT NOT NULL DEFAULT '07:00',
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS profile_scrape_settings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_slug TEXT NOT NULL,
    auto_scrape_enabled BOOLEAN NOT NULL DEFAULT 0,
    scrape_time TEXT NOT NULL DEFAULT '03:00',
    last_scrape TEXT,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_profile_settings_slug ON profile_scrape_settings(category_slug);

CREATE TABLE IF NOT EXISTS series_scrape_settings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_slug TEXT NOT NULL,
    auto_scrape_enabled BOOLEAN NOT NULL DEFAULT 0,
    scrape_time TEXT NOT NULL DEFAULT '03:00',
    last_scrape TEXT,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_series_settings_slug ON series_scrape_settings(category_slug);

CREATE TABLE IF NOT EXISTS match_scrape_settings (
    id INTEGER PRIMARY KEY,
    auto_scrape_enabled BOOLEAN NOT NULL DEFAULT 0,
    interval_hours INTEGER NOT NULL DEFAULT 6,
    last_scrape TEXT,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS live_score_scrape_settings (
    id INTEGER PRIMARY KEY,
    auto_scrape_enabled BOOLEAN NOT NULL DEFAULT 0,
    interval_seconds INTEGER NOT NULL DEFAULT 60,
    last_scrape TEXT,
    updated_at TEXT NOT NULL
);
"#;

/// Id of the single row in each singleton settings table.
pub(crate) const SETTINGS_ROW: i32 = 1;

/// Default daily time for per-category profile and series schedules.
const DEFAULT_CATEGORY_TIME: &str = "03:00";

/// Row counts for the stored dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetCounts {
    pub teams: i64,
    pub players: i64,
    pub profiles_scraped: i64,
    pub series: i64,
    pub matches: i64,
    pub live_matches: i64,
    pub scrape_logs: i64,
}

/// Entity kinds that can be bulk-cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    Matches,
    Series,
    Players,
    Teams,
    All,
}

impl ClearTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matches => "matches",
            Self::Series => "series",
            Self::Players => "players",
            Self::Teams => "teams",
            Self::All => "all",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "matches" => Some(Self::Matches),
            "series" => Some(Self::Series),
            "players" => Some(Self::Players),
            "teams" => Some(Self::Teams),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Database context that manages the connection pool and provides repository access.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::from_url("sqlite:data/crease.db");
/// ctx.initialize(crease::config::DEFAULT_BASE_URL).await?;
/// let teams = ctx.teams().by_category("international").await?;
/// ```
#[derive(Clone, Debug)]
pub struct DbContext {
    pool: DbPool,
}

impl DbContext {
    /// Create a context from a database file path.
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: DbPool::from_path(db_path),
        }
    }

    /// Create a context from a database URL (`sqlite:` prefix optional).
    pub fn from_url(url: &str) -> Self {
        Self {
            pool: DbPool::new(url),
        }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn teams(&self) -> TeamRepository {
        TeamRepository::new(self.pool.clone())
    }

    pub fn players(&self) -> PlayerRepository {
        PlayerRepository::new(self.pool.clone())
    }

    pub fn series(&self) -> SeriesRepository {
        SeriesRepository::new(self.pool.clone())
    }

    pub fn matches(&self) -> MatchRepository {
        MatchRepository::new(self.pool.clone())
    }

    pub fn logs(&self) -> ScrapeLogRepository {
        ScrapeLogRepository::new(self.pool.clone())
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.pool.clone())
    }

    /// Create every table and index if missing.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(SCHEMA_SQL).await
    }

    /// Create the schema and seed categories and settings rows.
    ///
    /// Safe to run repeatedly: existing rows are left untouched.
    pub async fn initialize(&self, base_url: &str) -> Result<(), DbError> {
        self.init_schema().await?;
        let mut conn = self.pool.get().await?;
        let base_url = base_url.to_string();
        conn.transaction(|conn| Box::pin(async move { seed(conn, &base_url).await }))
            .await?;
        info!("Database schema ready");
        Ok(())
    }

    /// Row counts across the dataset.
    pub async fn counts(&self) -> Result<DatasetCounts, DbError> {
        use diesel::dsl::count_star;
        let mut conn = self.pool.get().await?;

        Ok(DatasetCounts {
            teams: teams::table.select(count_star()).first(&mut conn).await?,
            players: players::table.select(count_star()).first(&mut conn).await?,
            profiles_scraped: players::table
                .filter(players::profile_scraped.eq(true))
                .select(count_star())
                .first(&mut conn)
                .await?,
            series: series::table.select(count_star()).first(&mut conn).await?,
            matches: matches::table.select(count_star()).first(&mut conn).await?,
            live_matches: matches::table
                .filter(matches::state.eq(MatchState::Live.as_str()))
                .select(count_star())
                .first(&mut conn)
                .await?,
            scrape_logs: scrape_logs::table.select(count_star()).first(&mut conn).await?,
        })
    }

    /// Delete every row of an entity kind, returning how many rows of that
    /// kind were removed. Clearing teams removes their players as well.
    pub async fn clear(&self, target: ClearTarget) -> Result<usize, DbError> {
        let mut conn = self.pool.get().await?;
        conn.transaction(|conn| {
            Box::pin(async move {
                let removed = match target {
                    ClearTarget::Matches => diesel::delete(matches::table).execute(conn).await?,
                    ClearTarget::Series => diesel::delete(series::table).execute(conn).await?,
                    ClearTarget::Players => diesel::delete(players::table).execute(conn).await?,
                    ClearTarget::Teams => diesel::delete(teams::table).execute(conn).await?,
                    ClearTarget::All => {
                        let mut n = diesel::delete(matches::table).execute(conn).await?;
                        n += diesel::delete(series::table).execute(conn).await?;
                        n += diesel::delete(players::table).execute(conn).await?;
                        n += diesel::delete(teams::table).execute(conn).await?;
                        n
                    }
                };
                Ok::<_, DbError>(removed)
            })
        })
        .await
    }
}

/// Insert the fixed categories and default settings rows.
async fn seed(conn: &mut SqliteConn, base_url: &str) -> Result<(), DbError> {
    let now = now_text();

    for def in TEAM_CATEGORIES {
        diesel::insert_or_ignore_into(team_categories::table)
            .values((
                team_categories::name.eq(def.name),
                team_categories::slug.eq(def.slug),
                team_categories::url.eq(def.url(base_url)),
                team_categories::created_at.eq(&now),
            ))
            .execute(conn)
            .await?;
    }

    for def in SERIES_CATEGORIES {
        diesel::insert_or_ignore_into(series_categories::table)
            .values((
                series_categories::name.eq(def.name),
                series_categories::slug.eq(def.slug),
                series_categories::url.eq(def.url(base_url)),
                series_categories::created_at.eq(&now),
            ))
            .execute(conn)
            .await?;
    }

    // Column defaults carry the default times.
    diesel::insert_or_ignore_into(scrape_settings::table)
        .values((
            scrape_settings::id.eq(SETTINGS_ROW),
            scrape_settings::updated_at.eq(&now),
        ))
        .execute(conn)
        .await?;

    for def in TEAM_CATEGORIES {
        diesel::insert_or_ignore_into(profile_scrape_settings::table)
            .values((
                profile_scrape_settings::category_slug.eq(def.slug),
                profile_scrape_settings::scrape_time.eq(DEFAULT_CATEGORY_TIME),
                profile_scrape_settings::updated_at.eq(&now),
            ))
            .execute(conn)
            .await?;
    }

    for def in SERIES_CATEGORIES {
        diesel::insert_or_ignore_into(series_scrape_settings::table)
            .values((
                series_scrape_settings::category_slug.eq(def.slug),
                series_scrape_settings::scrape_time.eq(DEFAULT_CATEGORY_TIME),
                series_scrape_settings::updated_at.eq(&now),
            ))
            .execute(conn)
            .await?;
    }

    diesel::insert_or_ignore_into(match_scrape_settings::table)
        .values((
            match_scrape_settings::id.eq(SETTINGS_ROW),
            match_scrape_settings::updated_at.eq(&now),
        ))
        .execute(conn)
        .await?;

    diesel::insert_or_ignore_into(live_score_scrape_settings::table)
        .values((
            live_score_scrape_settings::id.eq(SETTINGS_ROW),
            live_score_scrape_settings::updated_at.eq(&now),
        ))
        .execute(conn)
        .await?;

    Ok(())
}
