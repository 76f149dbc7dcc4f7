//! End-to-end ingest flows over canned pages.

use std::sync::Arc;

use crease::config::DEFAULT_BASE_URL as BASE;
use crease::models::{LogStatus, MatchState};
use crease::progress::ProgressRegistry;
use crease::repository::DbContext;
use crease::scrapers::{FixtureSource, RateLimitConfig, RateLimiter};
use crease::services::{IngestJob, IngestOptions, Ingestor};

const TEAM_LISTING: &str = include_str!("fixtures/team_listing.html");
const ROSTER: &str = include_str!("fixtures/roster.html");
const PROFILE: &str = include_str!("fixtures/profile.html");
const SERIES_PREVIEW: &str = include_str!("fixtures/series_preview.html");
const SERIES_COMPLETE: &str = include_str!("fixtures/series_complete.html");
const SCORECARD_MISMATCH: &str = include_str!("fixtures/scorecard_mismatch.html");
const LIVE_BOARD: &str = include_str!("fixtures/live_board.html");

const SERIES_URL: &str = "https://www.cricbuzz.com/cricket-series/9237/australia-tour-of-india-2026/matches";

async fn setup() -> (DbContext, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let ctx = DbContext::new(&dir.path().join("crease.db"));
    ctx.initialize(BASE).await.unwrap();
    (ctx, dir)
}

fn ingestor(ctx: &DbContext, source: FixtureSource) -> Ingestor {
    Ingestor::new(
        ctx.clone(),
        Arc::new(source),
        RateLimiter::with_config(RateLimitConfig::immediate()),
        ProgressRegistry::new(),
        IngestOptions {
            base_url: BASE.to_string(),
            profile_commit_every: 1,
        },
    )
}

fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

#[tokio::test]
async fn teams_rosters_then_profiles() {
    let (ctx, _dir) = setup().await;
    let source = FixtureSource::new()
        .with_page(url("/cricket-team"), TEAM_LISTING)
        .with_page(url("/cricket-team/india/2/players"), ROSTER)
        .with_page(url("/profiles/1413/virat-kohli"), PROFILE);
    let ingest = ingestor(&ctx, source.clone());

    let teams = ingest.run(&IngestJob::TeamCategory("international".into())).await;
    assert!(teams.success, "{}", teams.message);
    assert_eq!(teams.counts.saved_new, 2);

    let roster = ingest.run(&IngestJob::TeamPlayers("2".into())).await;
    assert!(roster.success, "{}", roster.message);
    assert_eq!(roster.counts.saved_new, 2);

    // Bumrah's profile page is missing; Kohli's still lands.
    let profiles = ingest
        .run(&IngestJob::Profiles {
            category: "international".into(),
            only_missing: true,
        })
        .await;
    assert!(profiles.success, "{}", profiles.message);
    assert_eq!(profiles.counts.total, 1);
    assert!(profiles.message.contains("1 failed"));

    let kohli = ctx.players().get_by_provider_id("1413").await.unwrap().unwrap();
    assert!(kohli.profile_scraped);
    assert_eq!(kohli.born.as_deref(), Some("Apr 30, 1987"));
    let odi = &kohli.batting_stats.unwrap().odi;
    assert_eq!(odi.get("average").map(String::as_str), Some("47.12"));

    // A later roster scrape leaves the enrichment alone.
    let again = ingest.run(&IngestJob::TeamPlayers("2".into())).await;
    assert_eq!(again.counts.updated_existing, 2);
    let kohli = ctx.players().get_by_provider_id("1413").await.unwrap().unwrap();
    assert!(kohli.profile_scraped);
    assert_eq!(kohli.born.as_deref(), Some("Apr 30, 1987"));

    // Only the unscraped player is fetched the second time round.
    let before = source.requests().len();
    ingest
        .run(&IngestJob::Profiles {
            category: "international".into(),
            only_missing: true,
        })
        .await;
    assert_eq!(
        source.requests()[before..],
        [url("/profiles/9311/jasprit-bumrah")]
    );

    let counts = ctx.counts().await.unwrap();
    assert_eq!(counts.teams, 2);
    assert_eq!(counts.players, 2);
    assert_eq!(counts.profiles_scraped, 1);
}

#[tokio::test]
async fn stored_scores_survive_a_scoreless_rescrape() {
    let (ctx, _dir) = setup().await;

    let complete = ingestor(&ctx, FixtureSource::new().with_page(SERIES_URL, SERIES_COMPLETE));
    let first = complete.run(&IngestJob::SeriesUrl(SERIES_URL.into())).await;
    assert!(first.success, "{}", first.message);

    let preview = ingestor(&ctx, FixtureSource::new().with_page(SERIES_URL, SERIES_PREVIEW));
    let second = preview.run(&IngestJob::SeriesUrl(SERIES_URL.into())).await;
    assert!(second.success, "{}", second.message);
    assert_eq!(second.counts.updated_existing, 1);

    let stored = ctx.matches().get_by_provider_id("125643").await.unwrap().unwrap();
    assert_eq!(stored.team1_score.as_deref(), Some("285/7 (49.4)"));
    assert_eq!(stored.series_id.as_deref(), Some("9237"));
}

#[tokio::test]
async fn scorecard_is_stored_under_the_page_id() {
    let (ctx, _dir) = setup().await;
    let source = FixtureSource::new().with_page(
        url("/live-cricket-scorecard/777666"),
        SCORECARD_MISMATCH,
    );
    let ingest = ingestor(&ctx, source);

    let outcome = ingest.run(&IngestJob::Match("777666".into())).await;
    assert!(outcome.success, "{}", outcome.message);

    assert!(ctx.matches().get_by_provider_id("777666").await.unwrap().is_none());
    let stored = ctx.matches().get_by_provider_id("999888").await.unwrap().unwrap();
    assert_eq!(stored.state, MatchState::Complete);
    assert_eq!(stored.result.as_deref(), Some("India won by 35 runs"));
    assert!(stored.innings_data.is_some());

    let logs = ctx.logs().recent(Some("scorecard"), 5).await.unwrap();
    assert_eq!(logs[0].status, LogStatus::Success);
}

#[tokio::test]
async fn live_board_updates_states() {
    let (ctx, _dir) = setup().await;
    let source = FixtureSource::new().with_page(url("/cricket-match/live-scores"), LIVE_BOARD);
    let ingest = ingestor(&ctx, source);

    let outcome = ingest.run(&IngestJob::LiveScores).await;
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.counts.saved_new, 2);

    let done = ctx.matches().get_by_provider_id("125643").await.unwrap().unwrap();
    assert_eq!(done.state, MatchState::Complete);
    assert_eq!(done.team2_score.as_deref(), Some("251/5 (47.2)"));
    let upcoming = ctx.matches().by_state(MatchState::Upcoming, 10).await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].match_id, "125700");
}

#[tokio::test]
async fn failed_scrape_writes_one_error_row() {
    let (ctx, _dir) = setup().await;
    let ingest = ingestor(&ctx, FixtureSource::new());

    let outcome = ingest.run(&IngestJob::Series("women".into())).await;
    assert!(!outcome.success);
    assert!(outcome.message.contains("404"));

    let logs = ctx.logs().recent(None, 10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, LogStatus::Error);
    assert_eq!(logs[0].category.as_deref(), Some("series:women"));
}
