//! Job specs derived from the persisted settings rows.

use std::time::Duration;

use tracing::warn;

use super::{JobSpec, ScheduleError, Trigger};
use crate::models::{CategorySchedule, ScrapeSetting, TEAM_CATEGORIES};
use crate::repository::{DbContext, DbError, ScheduleTouch};
use crate::services::IngestJob;

pub const DAILY_SCRAPE: &str = "daily_scrape";
pub const DAILY_PLAYER_SCRAPE: &str = "daily_player_scrape";
pub const MATCH_SCRAPE_ALL: &str = "match_scrape_all";
pub const LIVE_SCORE_SCRAPE: &str = "live_score_scrape";

pub fn player_job_id(slug: &str) -> String {
    format!("player_scrape_{}", slug)
}

pub fn profile_job_id(slug: &str) -> String {
    format!("profile_scrape_{}", slug)
}

pub fn series_job_id(slug: &str) -> String {
    format!("series_scrape_{}", slug)
}

fn daily(id: String, at: &str, job: IngestJob, tag: String, touch: ScheduleTouch) -> Result<JobSpec, ScheduleError> {
    Ok(JobSpec {
        id,
        trigger: Trigger::daily(at)?,
        job,
        tag,
        touch,
    })
}

/// Jobs wanted by the global team/roster settings row.
pub fn team_jobs(setting: &ScrapeSetting) -> Vec<Result<JobSpec, ScheduleError>> {
    let mut specs = Vec::new();
    if setting.auto_scrape_enabled {
        specs.push(daily(
            DAILY_SCRAPE.to_string(),
            &setting.scrape_time,
            IngestJob::AllTeams,
            "auto_daily".to_string(),
            ScheduleTouch::Teams,
        ));
    }
    if setting.player_auto_scrape_enabled {
        specs.push(daily(
            DAILY_PLAYER_SCRAPE.to_string(),
            &setting.player_scrape_time,
            IngestJob::Players(None),
            "auto_players".to_string(),
            ScheduleTouch::Players,
        ));
    }
    for def in TEAM_CATEGORIES {
        if let Some((true, at)) = setting.category_players(def.slug) {
            specs.push(daily(
                player_job_id(def.slug),
                at,
                IngestJob::Players(Some(def.slug.to_string())),
                format!("players:{}", def.slug),
                ScheduleTouch::Players,
            ));
        }
    }
    specs
}

/// Scheduled profile runs refresh every player, not just the unscraped ones.
pub fn profile_jobs(rows: &[CategorySchedule]) -> Vec<Result<JobSpec, ScheduleError>> {
    rows.iter()
        .filter(|r| r.auto_scrape_enabled)
        .map(|r| {
            daily(
                profile_job_id(&r.category_slug),
                &r.scrape_time,
                IngestJob::Profiles {
                    category: r.category_slug.clone(),
                    only_missing: false,
                },
                format!("profiles:{}", r.category_slug),
                ScheduleTouch::Profiles(r.category_slug.clone()),
            )
        })
        .collect()
}

pub fn series_jobs(rows: &[CategorySchedule]) -> Vec<Result<JobSpec, ScheduleError>> {
    rows.iter()
        .filter(|r| r.auto_scrape_enabled)
        .map(|r| {
            daily(
                series_job_id(&r.category_slug),
                &r.scrape_time,
                IngestJob::Series(r.category_slug.clone()),
                format!("series:{}", r.category_slug),
                ScheduleTouch::Series(r.category_slug.clone()),
            )
        })
        .collect()
}

fn interval(
    id: &str,
    secs: i64,
    job: IngestJob,
    tag: &str,
    touch: ScheduleTouch,
) -> Result<JobSpec, ScheduleError> {
    if secs <= 0 {
        return Err(ScheduleError::InvalidInterval(id.to_string()));
    }
    Ok(JobSpec {
        id: id.to_string(),
        trigger: Trigger::every(Duration::from_secs(secs as u64)),
        job,
        tag: tag.to_string(),
        touch,
    })
}

/// Every job the stored settings ask for. Rows with a malformed time are
/// skipped with a warning so one bad row does not stop the rest.
pub async fn desired_jobs(ctx: &DbContext) -> Result<Vec<JobSpec>, DbError> {
    let settings = ctx.settings();
    let mut candidates = team_jobs(&settings.scrape_setting().await?);
    candidates.extend(profile_jobs(&settings.profile_schedules().await?));
    candidates.extend(series_jobs(&settings.series_schedules().await?));

    let matches = settings.match_setting().await?;
    if matches.auto_scrape_enabled {
        candidates.push(interval(
            MATCH_SCRAPE_ALL,
            i64::from(matches.interval_hours) * 3600,
            IngestJob::AllSeriesMatches,
            "matches",
            ScheduleTouch::Matches,
        ));
    }
    let live = settings.live_setting().await?;
    if live.auto_scrape_enabled {
        candidates.push(interval(
            LIVE_SCORE_SCRAPE,
            i64::from(live.interval_seconds),
            IngestJob::LiveScores,
            "live",
            ScheduleTouch::Live,
        ));
    }

    Ok(candidates
        .into_iter()
        .filter_map(|spec| match spec {
            Ok(spec) => Some(spec),
            Err(e) => {
                warn!("Skipping schedule entry: {}", e);
                None
            }
        })
        .collect())
}

/// Whether the stored settings still ask for exactly `spec`.
pub async fn is_current(ctx: &DbContext, spec: &JobSpec) -> Result<bool, DbError> {
    Ok(desired_jobs(ctx).await?.iter().any(|s| s == spec))
}
