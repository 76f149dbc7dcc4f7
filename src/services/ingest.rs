//! Ingest flows: fetch, parse, verify, upsert, log.
//!
//! Every entry point returns an [`OperationOutcome`] and never propagates
//! an error; failures become an error row in the scrape log and an `Error`
//! entry in the progress registry.

use std::sync::Arc;

use chrono::Datelike;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::models::{team_category, series_category, LogEntry, Series, Team, TEAM_CATEGORIES};
use crate::progress::ProgressRegistry;
use crate::repository::{DbContext, DbError};
use crate::scrapers::identity::{is_valid_id, series_id_from_url};
use crate::scrapers::parse::{
    parse_live_scores, parse_match_page, parse_profile, parse_roster, parse_scorecard,
    parse_series_listing, parse_series_matches, parse_team_listing,
};
use crate::scrapers::records::{MatchRec, ProfileRec};
use crate::scrapers::{absolute_url, FetchError, HttpClient, PageSource, RateLimitConfig, RateLimiter};
use crate::upsert::{BatchCounts, UpsertError, Upserter};

/// Live-score board path.
const LIVE_SCORES_PATH: &str = "/cricket-match/live-scores";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("no {what} found at {url}")]
    Empty { what: &'static str, url: String },
    #[error(transparent)]
    Upsert(#[from] UpsertError),
    #[error("storage error: {0}")]
    Storage(#[from] DbError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid input: {0}")]
    Invalid(String),
}

impl IngestError {
    /// Batch failures are logged by the upserter itself.
    fn already_logged(&self) -> bool {
        matches!(self, IngestError::Upsert(_))
    }
}

/// Result of an on-demand or scheduled operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
    pub counts: BatchCounts,
}

impl OperationOutcome {
    pub fn into_result(self) -> Result<OperationOutcome, String> {
        if self.success {
            Ok(self)
        } else {
            Err(self.message)
        }
    }
}

/// What a successful run produced.
struct Summary {
    counts: BatchCounts,
    teams: usize,
    players: usize,
    message: String,
}

/// A unit of ingest work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestJob {
    /// Teams of one team category.
    TeamCategory(String),
    /// Teams of every team category.
    AllTeams,
    /// Roster of one team, by provider team id.
    TeamPlayers(String),
    /// Rosters of every team with a URL, optionally limited to one category.
    Players(Option<String>),
    /// Profiles of a category's players.
    Profiles { category: String, only_missing: bool },
    /// Series listing of one series category.
    Series(String),
    /// Matches of every stored series.
    AllSeriesMatches,
    /// Matches of one series page given by URL.
    SeriesUrl(String),
    /// The live-score board.
    LiveScores,
    /// One match's scorecard, by provider match id.
    Match(String),
}

impl IngestJob {
    /// Progress registry key.
    pub fn progress_key(&self) -> String {
        match self {
            IngestJob::TeamCategory(slug) => slug.clone(),
            IngestJob::AllTeams => "teams".to_string(),
            IngestJob::TeamPlayers(id) => format!("players:team:{}", id),
            IngestJob::Players(Some(slug)) => format!("players:{}", slug),
            IngestJob::Players(None) => "players".to_string(),
            IngestJob::Profiles { category, .. } => format!("profiles:{}", category),
            IngestJob::Series(slug) => format!("series:{}", slug),
            IngestJob::AllSeriesMatches | IngestJob::SeriesUrl(_) => "matches".to_string(),
            IngestJob::LiveScores => "live".to_string(),
            IngestJob::Match(id) => format!("scorecard:{}", id),
        }
    }

    /// Default scrape-log category tag.
    pub fn log_tag(&self) -> String {
        match self {
            IngestJob::TeamCategory(slug) => slug.clone(),
            IngestJob::AllTeams => "all".to_string(),
            IngestJob::TeamPlayers(_) | IngestJob::Players(None) => "players".to_string(),
            IngestJob::Players(Some(slug)) => format!("players:{}", slug),
            IngestJob::Profiles { category, .. } => format!("profiles:{}", category),
            IngestJob::Series(slug) => format!("series:{}", slug),
            IngestJob::AllSeriesMatches | IngestJob::SeriesUrl(_) => "matches".to_string(),
            IngestJob::LiveScores => "live".to_string(),
            IngestJob::Match(_) => "scorecard".to_string(),
        }
    }
}

/// Tunables for ingest runs.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub base_url: String,
    /// Profile scrapes commit after this many players.
    pub profile_commit_every: usize,
}

impl IngestOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            profile_commit_every: settings.profile_commit_every.max(1),
        }
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Composes fetching, parsing and storage for every job kind.
#[derive(Clone)]
pub struct Ingestor {
    ctx: DbContext,
    source: Arc<dyn PageSource>,
    pacer: RateLimiter,
    upserter: Upserter,
    progress: ProgressRegistry,
    options: IngestOptions,
}

impl Ingestor {
    pub fn new(
        ctx: DbContext,
        source: Arc<dyn PageSource>,
        pacer: RateLimiter,
        progress: ProgressRegistry,
        options: IngestOptions,
    ) -> Self {
        let upserter = Upserter::new(ctx.pool().clone());
        Self {
            ctx,
            source,
            pacer,
            upserter,
            progress,
            options,
        }
    }

    /// Build an ingestor that fetches over HTTP.
    pub fn from_settings(
        settings: &Settings,
        ctx: DbContext,
        progress: ProgressRegistry,
    ) -> Result<Self, FetchError> {
        let limiter = RateLimiter::with_config(RateLimitConfig::from_settings(settings));
        let client = HttpClient::from_settings(settings, limiter.clone())?;
        Ok(Self::new(
            ctx,
            Arc::new(client),
            limiter,
            progress,
            IngestOptions::from_settings(settings),
        ))
    }

    pub fn progress(&self) -> &ProgressRegistry {
        &self.progress
    }

    pub fn context(&self) -> &DbContext {
        &self.ctx
    }

    /// Run a job with its default log tag.
    pub async fn run(&self, job: &IngestJob) -> OperationOutcome {
        self.run_tagged(job, &job.log_tag()).await
    }

    /// Run a job, logging under `tag`.
    pub async fn run_tagged(&self, job: &IngestJob, tag: &str) -> OperationOutcome {
        let key = job.progress_key();
        self.progress.start(&key, 0);
        info!("Starting {:?} [{}]", job, tag);

        let result = match job {
            IngestJob::TeamCategory(slug) => self.teams_of_category(slug, tag, &key).await,
            IngestJob::AllTeams => self.all_teams(tag, &key).await,
            IngestJob::TeamPlayers(team_id) => self.team_players(team_id, tag, &key).await,
            IngestJob::Players(category) => self.players(category.as_deref(), tag, &key).await,
            IngestJob::Profiles {
                category,
                only_missing,
            } => self.profiles(category, *only_missing, tag, &key).await,
            IngestJob::Series(slug) => self.series(slug, tag).await,
            IngestJob::AllSeriesMatches => self.all_series_matches(tag, &key).await,
            IngestJob::SeriesUrl(url) => self.series_url(url, tag).await,
            IngestJob::LiveScores => self.live_scores(tag).await,
            IngestJob::Match(match_id) => self.scorecard(match_id, tag).await,
        };

        self.finish(tag, &key, result).await
    }

    /// Run a job in the background under its progress key.
    pub fn spawn(&self, job: IngestJob) -> (String, JoinHandle<Option<OperationOutcome>>) {
        let key = job.progress_key();
        let this = self.clone();
        let handle = self
            .progress
            .spawn_tracked(&key, async move { this.run(&job).await.into_result() });
        (key, handle)
    }

    async fn finish(
        &self,
        tag: &str,
        key: &str,
        result: Result<Summary, IngestError>,
    ) -> OperationOutcome {
        match result {
            Ok(summary) => {
                info!("{}", summary.message);
                let entry = LogEntry::success(tag, summary.message.clone())
                    .with_counts(summary.teams, summary.players);
                if let Err(e) = self.ctx.logs().append(&entry).await {
                    warn!("Failed to write scrape log: {}", e);
                }
                self.progress.complete(key);
                OperationOutcome {
                    success: true,
                    message: summary.message,
                    counts: summary.counts,
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Scrape [{}] failed: {}", tag, message);
                if !e.already_logged() {
                    if let Err(log_err) = self.ctx.logs().append(&LogEntry::error(tag, &message)).await {
                        warn!("Failed to write scrape log: {}", log_err);
                    }
                }
                self.progress.fail(key, &message);
                OperationOutcome {
                    success: false,
                    message,
                    counts: BatchCounts::default(),
                }
            }
        }
    }

    fn url(&self, path: &str) -> String {
        absolute_url(&self.options.base_url, path)
    }

    async fn teams_of_category(&self, slug: &str, tag: &str, key: &str) -> Result<Summary, IngestError> {
        let def = team_category(slug).ok_or_else(|| IngestError::NotFound(format!("team category '{}'", slug)))?;
        let url = def.url(&self.options.base_url);
        self.progress.set_total(key, 1);
        self.progress.advance(key, 1, def.name);

        let html = self.source.fetch(&url).await?;
        let teams = parse_team_listing(&html, &self.options.base_url);
        if teams.is_empty() {
            return Err(IngestError::Empty { what: "teams", url });
        }
        let counts = self.upserter.upsert_teams(slug, &teams, tag).await?;
        Ok(Summary {
            counts,
            teams: counts.total,
            players: 0,
            message: format!(
                "Scraped {} {} teams ({} new, {} updated)",
                counts.total, def.name, counts.saved_new, counts.updated_existing
            ),
        })
    }

    async fn all_teams(&self, tag: &str, key: &str) -> Result<Summary, IngestError> {
        self.progress.set_total(key, TEAM_CATEGORIES.len());
        let mut counts = BatchCounts::default();
        let mut failures = Vec::new();

        for (i, def) in TEAM_CATEGORIES.iter().enumerate() {
            if i > 0 {
                self.pacer.pause().await;
            }
            self.progress.advance(key, i + 1, def.name);
            let url = def.url(&self.options.base_url);
            let html = match self.source.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Skipping {} teams: {}", def.slug, e);
                    failures.push(def.slug);
                    continue;
                }
            };
            let teams = parse_team_listing(&html, &self.options.base_url);
            if teams.is_empty() {
                warn!("No teams parsed for {}", def.slug);
                failures.push(def.slug);
                continue;
            }
            counts = counts.merge(self.upserter.upsert_teams(def.slug, &teams, tag).await?);
        }

        if failures.len() == TEAM_CATEGORIES.len() {
            return Err(IngestError::Empty {
                what: "teams",
                url: self.url("/cricket-team"),
            });
        }
        let mut message = format!(
            "Scraped {} teams across {} categories ({} new, {} updated)",
            counts.total,
            TEAM_CATEGORIES.len() - failures.len(),
            counts.saved_new,
            counts.updated_existing
        );
        if !failures.is_empty() {
            message.push_str(&format!("; failed: {}", failures.join(", ")));
        }
        Ok(Summary {
            counts,
            teams: counts.total,
            players: 0,
            message,
        })
    }

    /// Fetch a roster from `<team_url>/players`, falling back to the team
    /// page itself when that fails or lists nobody.
    async fn roster(&self, team: &Team) -> Result<Vec<crate::scrapers::PlayerRec>, IngestError> {
        let team_url = team
            .team_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| IngestError::NotFound(format!("URL for team {}", team.name)))?;
        let players_url = format!("{}/players", team_url.trim_end_matches('/'));

        match self.source.fetch(&players_url).await {
            Ok(html) => {
                let players = parse_roster(&html, &self.options.base_url);
                if !players.is_empty() {
                    return Ok(players);
                }
                debug!("Empty roster at {}, trying team page", players_url);
            }
            Err(e) => debug!("Roster page failed ({}), trying team page", e),
        }

        let html = self.source.fetch(team_url).await?;
        let players = parse_roster(&html, &self.options.base_url);
        if players.is_empty() {
            return Err(IngestError::Empty {
                what: "players",
                url: team_url.to_string(),
            });
        }
        Ok(players)
    }

    async fn team_players(&self, team_id: &str, tag: &str, key: &str) -> Result<Summary, IngestError> {
        let team = self
            .ctx
            .teams()
            .get_by_provider_id(team_id)
            .await?
            .ok_or_else(|| IngestError::NotFound(format!("team {}", team_id)))?;
        self.progress.set_total(key, 1);
        self.progress.advance(key, 1, &team.name);

        let players = self.roster(&team).await?;
        let counts = self.upserter.upsert_players(team.id, &players, tag).await?;
        Ok(Summary {
            counts,
            teams: 1,
            players: counts.total,
            message: format!(
                "Scraped {} players for {} ({} new, {} updated)",
                counts.total, team.name, counts.saved_new, counts.updated_existing
            ),
        })
    }

    async fn players(&self, category: Option<&str>, tag: &str, key: &str) -> Result<Summary, IngestError> {
        let teams = self.ctx.teams().with_url(category).await?;
        if teams.is_empty() {
            return Err(IngestError::NotFound(match category {
                Some(slug) => format!("teams with URLs in '{}'", slug),
                None => "teams with URLs".to_string(),
            }));
        }
        self.progress.set_total(key, teams.len());

        let mut counts = BatchCounts::default();
        let mut scraped_teams = 0;
        let mut failed = 0;
        for (i, team) in teams.iter().enumerate() {
            if i > 0 {
                self.pacer.pause().await;
            }
            self.progress.advance(key, i + 1, &team.name);
            match self.roster(team).await {
                Ok(players) => {
                    counts = counts.merge(self.upserter.upsert_players(team.id, &players, tag).await?);
                    scraped_teams += 1;
                }
                Err(e) => {
                    warn!("Skipping roster of {}: {}", team.name, e);
                    failed += 1;
                }
            }
        }

        if scraped_teams == 0 {
            return Err(IngestError::Empty {
                what: "players",
                url: format!("{} team pages", teams.len()),
            });
        }
        let mut message = format!(
            "Scraped {} players from {} teams ({} new, {} updated)",
            counts.total, scraped_teams, counts.saved_new, counts.updated_existing
        );
        if failed > 0 {
            message.push_str(&format!("; {} teams failed", failed));
        }
        Ok(Summary {
            counts,
            teams: scraped_teams,
            players: counts.total,
            message,
        })
    }

    async fn profiles(
        &self,
        category: &str,
        only_missing: bool,
        tag: &str,
        key: &str,
    ) -> Result<Summary, IngestError> {
        if team_category(category).is_none() {
            return Err(IngestError::NotFound(format!("team category '{}'", category)));
        }
        let players = self.ctx.players().for_profiles(category, only_missing).await?;
        self.progress.set_total(key, players.len());

        let commit_every = self.options.profile_commit_every.max(1);
        let mut pending: Vec<(i32, ProfileRec)> = Vec::with_capacity(commit_every);
        let mut counts = BatchCounts::default();
        let mut failed = 0;

        for (i, player) in players.iter().enumerate() {
            if i > 0 {
                self.pacer.pause().await;
            }
            self.progress.advance(key, i + 1, &player.name);
            let Some(url) = player.player_url.as_deref() else { continue };
            let profile = match self.source.fetch(url).await {
                Ok(html) => parse_profile(&html),
                Err(e) => {
                    warn!("Skipping profile of {}: {}", player.name, e);
                    failed += 1;
                    continue;
                }
            };
            if profile.is_empty() {
                debug!("Profile page for {} yielded nothing", player.name);
                failed += 1;
                continue;
            }
            pending.push((player.id, profile));
            if pending.len() >= commit_every {
                counts = counts.merge(self.upserter.apply_profiles(&pending, tag).await?);
                pending.clear();
            }
        }
        if !pending.is_empty() {
            counts = counts.merge(self.upserter.apply_profiles(&pending, tag).await?);
        }

        if counts.total == 0 && !players.is_empty() {
            return Err(IngestError::Empty {
                what: "profiles",
                url: format!("{} profile pages", players.len()),
            });
        }
        let mut message = format!("Scraped {} {} player profiles", counts.total, category);
        if failed > 0 {
            message.push_str(&format!("; {} failed", failed));
        }
        Ok(Summary {
            counts,
            teams: 0,
            players: counts.total,
            message,
        })
    }

    async fn series(&self, slug: &str, tag: &str) -> Result<Summary, IngestError> {
        let def = series_category(slug)
            .ok_or_else(|| IngestError::NotFound(format!("series category '{}'", slug)))?;
        let url = def.url(&self.options.base_url);
        let html = self.source.fetch(&url).await?;
        let year = chrono::Local::now().year();
        let series = parse_series_listing(&html, &self.options.base_url, year);
        if series.is_empty() {
            return Err(IngestError::Empty { what: "series", url });
        }
        let counts = self.upserter.upsert_series(Some(slug), &series, tag).await?;
        Ok(Summary {
            counts,
            teams: 0,
            players: 0,
            message: format!(
                "Scraped {} {} series ({} new, {} updated)",
                counts.total, def.name, counts.saved_new, counts.updated_existing
            ),
        })
    }

    async fn matches_of(&self, series: &Series, tag: &str) -> Result<BatchCounts, IngestError> {
        let url = series
            .series_url
            .as_deref()
            .ok_or_else(|| IngestError::NotFound(format!("URL for series {}", series.name)))?;
        let html = self.source.fetch(url).await?;
        let matches = parse_series_matches(&html, &self.options.base_url, Some(&series.series_id));
        if matches.is_empty() {
            return Err(IngestError::Empty {
                what: "matches",
                url: url.to_string(),
            });
        }
        Ok(self.upserter.upsert_matches(&matches, Some(series.id), tag).await?)
    }

    async fn all_series_matches(&self, tag: &str, key: &str) -> Result<Summary, IngestError> {
        let all = self.ctx.series().with_url().await?;
        if all.is_empty() {
            return Err(IngestError::NotFound("series with URLs".to_string()));
        }
        self.progress.set_total(key, all.len());

        let mut counts = BatchCounts::default();
        let mut failed = 0;
        for (i, series) in all.iter().enumerate() {
            if i > 0 {
                self.pacer.pause().await;
            }
            self.progress.advance(key, i + 1, &series.name);
            match self.matches_of(series, tag).await {
                Ok(c) => counts = counts.merge(c),
                Err(e @ IngestError::Upsert(_)) => return Err(e),
                Err(e) => {
                    debug!("No matches for {}: {}", series.name, e);
                    failed += 1;
                }
            }
        }

        let mut message = format!(
            "Scraped {} matches from {} series ({} new, {} updated)",
            counts.total,
            all.len() - failed,
            counts.saved_new,
            counts.updated_existing
        );
        if failed > 0 {
            message.push_str(&format!("; {} series yielded nothing", failed));
        }
        Ok(Summary {
            counts,
            teams: 0,
            players: 0,
            message,
        })
    }

    async fn series_url(&self, url: &str, tag: &str) -> Result<Summary, IngestError> {
        let series_id = series_id_from_url(url)
            .ok_or_else(|| IngestError::Invalid(format!("no series id in {}", url)))?;
        let html = self.source.fetch(url).await?;
        let matches = parse_series_matches(&html, &self.options.base_url, Some(&series_id));
        if matches.is_empty() {
            return Err(IngestError::Empty {
                what: "matches",
                url: url.to_string(),
            });
        }
        let series_ref = self
            .ctx
            .series()
            .get_by_provider_id(&series_id)
            .await?
            .map(|s| s.id);
        let counts = self.upserter.upsert_matches(&matches, series_ref, tag).await?;
        Ok(Summary {
            counts,
            teams: 0,
            players: 0,
            message: format!(
                "Scraped {} matches of series {} ({} new, {} updated)",
                counts.total, series_id, counts.saved_new, counts.updated_existing
            ),
        })
    }

    async fn live_scores(&self, tag: &str) -> Result<Summary, IngestError> {
        let url = self.url(LIVE_SCORES_PATH);
        let html = self.source.fetch(&url).await?;
        let matches = parse_live_scores(&html, &self.options.base_url);
        if matches.is_empty() {
            return Err(IngestError::Empty { what: "matches", url });
        }
        let counts = self.upserter.upsert_matches(&matches, None, tag).await?;
        Ok(Summary {
            counts,
            teams: 0,
            players: 0,
            message: format!(
                "Updated {} matches from the live board ({} new)",
                counts.total, counts.saved_new
            ),
        })
    }

    async fn scorecard(&self, match_id: &str, tag: &str) -> Result<Summary, IngestError> {
        if !is_valid_id(match_id) {
            return Err(IngestError::Invalid(format!("match id '{}'", match_id)));
        }
        let url = self.url(&format!("/live-cricket-scorecard/{}", match_id));
        let html = self.source.fetch(&url).await?;

        let card = parse_scorecard(&html, match_id);
        let page = parse_match_page(&html, match_id, &self.options.base_url);
        if card.innings.is_empty() && page.team1_name.is_none() && page.series_id.is_none() {
            return Err(IngestError::Empty { what: "scorecard", url });
        }
        let rec = combine_scorecard(page, card.to_match_rec());
        let counts = self.upserter.upsert_match(&rec, tag).await?;
        Ok(Summary {
            counts,
            teams: 0,
            players: 0,
            message: format!(
                "Scraped scorecard of match {} ({} innings)",
                rec.match_id,
                card.innings.len()
            ),
        })
    }
}

/// Overlay scorecard detail on the match read from the same page's payload.
fn combine_scorecard(mut page: MatchRec, card: MatchRec) -> MatchRec {
    fn take(slot: &mut Option<String>, fresh: Option<String>) {
        if fresh.as_deref().is_some_and(|v| !v.is_empty()) {
            *slot = fresh;
        }
    }

    if page.match_id.is_empty() {
        page.match_id = card.match_id;
    }
    take(&mut page.result, card.result);
    take(&mut page.toss, card.toss);
    take(&mut page.venue, card.venue);
    if page.match_date.is_none() {
        page.match_date = card.match_date;
    }
    if page.team1_score.is_empty() {
        page.team1_score = card.team1_score;
    }
    if page.team2_score.is_empty() {
        page.team2_score = card.team2_score;
    }
    if page.team1_name.is_none() {
        page.team1_name = card.team1_name;
    }
    if page.team2_name.is_none() {
        page.team2_name = card.team2_name;
    }
    if page.state.is_none() {
        page.state = card.state;
    }
    page.batting_data = card.batting_data.or(page.batting_data);
    page.bowling_data = card.bowling_data.or(page.bowling_data);
    page.innings_data = card.innings_data.or(page.innings_data);
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogStatus, MatchState};
    use crate::progress::ProgressStatus;
    use crate::repository::test_support::test_context;
    use crate::scrapers::FixtureSource;

    #[test]
    fn test_job_keys_and_tags() {
        let job = IngestJob::Profiles {
            category: "women".into(),
            only_missing: true,
        };
        assert_eq!(job.progress_key(), "profiles:women");
        assert_eq!(job.log_tag(), "profiles:women");
        assert_eq!(IngestJob::LiveScores.log_tag(), "live");
        assert_eq!(IngestJob::Match("9".into()).log_tag(), "scorecard");
        assert_eq!(IngestJob::Players(Some("league".into())).progress_key(), "players:league");
        assert_eq!(IngestJob::TeamCategory("domestic".into()).progress_key(), "domestic");
    }

    #[test]
    fn test_combine_scorecard_prefers_page_identity() {
        let page = MatchRec {
            match_id: "999888".into(),
            team1_name: Some("India".into()),
            state: Some(MatchState::Live),
            ..Default::default()
        };
        let card = MatchRec {
            match_id: "999888".into(),
            team1_name: Some("IND".into()),
            team1_score: "250/9 (50)".into(),
            result: Some("India won by 10 runs".into()),
            state: Some(MatchState::Complete),
            innings_data: Some(serde_json::json!([])),
            ..Default::default()
        };
        let rec = combine_scorecard(page, card);
        assert_eq!(rec.team1_name.as_deref(), Some("India"));
        assert_eq!(rec.team1_score, "250/9 (50)");
        assert_eq!(rec.result.as_deref(), Some("India won by 10 runs"));
        assert_eq!(rec.state, Some(MatchState::Live));
        assert!(rec.innings_data.is_some());
    }

    const BASE: &str = "https://www.cricbuzz.com";

    fn ingestor(ctx: DbContext, source: FixtureSource) -> Ingestor {
        Ingestor::new(
            ctx,
            Arc::new(source),
            RateLimiter::with_config(RateLimitConfig::immediate()),
            ProgressRegistry::new(),
            IngestOptions {
                base_url: BASE.to_string(),
                profile_commit_every: 2,
            },
        )
    }

    const TEAM_LISTING: &str = r#"
        <div>
          <a href="/cricket-team/india/2"><img src="//static.cricbuzz.com/flags/ind.png">India</a>
          <a href="/cricket-team/australia/4">Australia</a>
        </div>"#;

    #[tokio::test]
    async fn test_team_category_run_logs_success() {
        let (ctx, _dir) = test_context().await;
        let source = FixtureSource::new().with_page(format!("{}/cricket-team", BASE), TEAM_LISTING);
        let ingest = ingestor(ctx.clone(), source);

        let job = IngestJob::TeamCategory("international".into());
        let outcome = ingest.run(&job).await;
        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(outcome.counts.saved_new, 2);

        let again = ingest.run(&job).await;
        assert_eq!(again.counts.updated_existing, 2);
        assert_eq!(again.counts.saved_new, 0);

        let logs = ctx.logs().recent(Some("international"), 10).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].teams_scraped, 2);
        assert_eq!(
            ingest.progress().get("international").unwrap().status,
            ProgressStatus::Complete
        );
    }

    #[tokio::test]
    async fn test_empty_listing_is_an_error() {
        let (ctx, _dir) = test_context().await;
        let source = FixtureSource::new().with_page(format!("{}/cricket-team/women", BASE), "<p>maintenance</p>");
        let ingest = ingestor(ctx.clone(), source);

        let outcome = ingest.run(&IngestJob::TeamCategory("women".into())).await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("no teams found"));

        let logs = ctx.logs().recent(Some("women"), 10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, LogStatus::Error);
        assert_eq!(
            ingest.progress().get("women").unwrap().status,
            ProgressStatus::Error
        );
        assert_eq!(ctx.counts().await.unwrap().teams, 0);
    }

    #[tokio::test]
    async fn test_unknown_category_fetches_nothing() {
        let (ctx, _dir) = test_context().await;
        let source = FixtureSource::new();
        let ingest = ingestor(ctx, source.clone());
        let outcome = ingest.run(&IngestJob::TeamCategory("nope".into())).await;
        assert!(!outcome.success);
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_roster_falls_back_to_team_page() {
        let (ctx, _dir) = test_context().await;
        let team_page = r#"<div><a href="/profiles/1413/virat-kohli">Virat Kohli</a><span>Batter</span></div>"#;
        let source = FixtureSource::new()
            .with_page(format!("{}/cricket-team", BASE), TEAM_LISTING)
            .with_page(format!("{}/cricket-team/india/2/players", BASE), "<p>none</p>")
            .with_page(format!("{}/cricket-team/india/2", BASE), team_page);
        let ingest = ingestor(ctx.clone(), source.clone());

        assert!(ingest.run(&IngestJob::TeamCategory("international".into())).await.success);
        let outcome = ingest.run(&IngestJob::TeamPlayers("2".into())).await;
        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(outcome.counts.saved_new, 1);
        assert!(source
            .requests()
            .ends_with(&[
                format!("{}/cricket-team/india/2/players", BASE),
                format!("{}/cricket-team/india/2", BASE),
            ]));

        // Australia has no roster at all; India still lands.
        let all = ingest.run(&IngestJob::Players(Some("international".into()))).await;
        assert!(all.success);
        assert!(all.message.contains("1 teams failed"));
        let player = ctx.players().get_by_provider_id("1413").await.unwrap().unwrap();
        assert_eq!(player.name, "Virat Kohli");
    }

    #[tokio::test]
    async fn test_invalid_match_id_rejected() {
        let (ctx, _dir) = test_context().await;
        let source = FixtureSource::new();
        let ingest = ingestor(ctx, source.clone());
        let outcome = ingest.run(&IngestJob::Match("12ab".into())).await;
        assert!(!outcome.success);
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_spawned_job_reports_through_registry() {
        let (ctx, _dir) = test_context().await;
        let ingest = ingestor(ctx, FixtureSource::new());
        let (key, handle) = ingest.spawn(IngestJob::LiveScores);
        assert_eq!(key, "live");
        assert_eq!(handle.await.unwrap(), None);
        let p = ingest.progress().get("live").unwrap();
        assert_eq!(p.status, ProgressStatus::Error);
        assert!(p.error.unwrap().contains("404"));
    }

    #[test]
    fn test_outcome_into_result() {
        let failed = OperationOutcome {
            success: false,
            message: "no teams found".into(),
            counts: BatchCounts::default(),
        };
        assert_eq!(failed.into_result().unwrap_err(), "no teams found");
    }
}
