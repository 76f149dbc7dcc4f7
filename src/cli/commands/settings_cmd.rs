//! Schedule settings commands.
//!
//! The daemon picks changes up on its next settings poll.

use console::style;

use super::SettingsCommands;
use crate::config::Settings;
use crate::models::CategorySchedule;
use crate::repository::{DbContext, SettingsRepository};
use crate::scheduler::Trigger;

/// Which schedule a `settings set` addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScheduleTarget {
    Teams,
    Players,
    CategoryPlayers(String),
    Profiles(String),
    Series(String),
    Matches,
    Live,
}

impl ScheduleTarget {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        let target = match raw.split_once(':') {
            None => match raw.as_str() {
                "teams" => Self::Teams,
                "players" => Self::Players,
                "matches" => Self::Matches,
                "live" => Self::Live,
                _ => anyhow::bail!("unknown schedule '{}'", raw),
            },
            Some((kind, slug)) if !slug.is_empty() => match kind {
                "players" => Self::CategoryPlayers(slug.to_string()),
                "profiles" => Self::Profiles(slug.to_string()),
                "series" => Self::Series(slug.to_string()),
                _ => anyhow::bail!("unknown schedule '{}'", raw),
            },
            Some(_) => anyhow::bail!("schedule '{}' needs a category", raw),
        };
        Ok(target)
    }
}

fn parse_switch(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "enable" | "enabled" | "yes" => Ok(true),
        "off" | "false" | "disable" | "disabled" | "no" => Ok(false),
        other => anyhow::bail!("expected on or off, got '{}'", other),
    }
}

/// The new daily time, validated, falling back to the stored one.
fn daily_time(requested: Option<&str>, stored: &str) -> anyhow::Result<String> {
    let at = requested.unwrap_or(stored).trim().to_string();
    Trigger::daily(&at)?;
    Ok(at)
}

fn stored_time<'a>(rows: &'a [CategorySchedule], slug: &str) -> anyhow::Result<&'a str> {
    rows.iter()
        .find(|r| r.category_slug == slug)
        .map(|r| r.scrape_time.as_str())
        .ok_or_else(|| anyhow::anyhow!("unknown category '{}'", slug))
}

async fn apply(
    repo: &SettingsRepository,
    target: &ScheduleTarget,
    enabled: bool,
    at: Option<&str>,
    every: Option<i32>,
) -> anyhow::Result<()> {
    match target {
        ScheduleTarget::Teams => {
            let current = repo.scrape_setting().await?;
            repo.set_team_schedule(enabled, &daily_time(at, &current.scrape_time)?)
                .await?;
        }
        ScheduleTarget::Players => {
            let current = repo.scrape_setting().await?;
            repo.set_player_schedule(enabled, &daily_time(at, &current.player_scrape_time)?)
                .await?;
        }
        ScheduleTarget::CategoryPlayers(slug) => {
            let current = repo.scrape_setting().await?;
            let Some((_, stored)) = current.category_players(slug) else {
                anyhow::bail!("unknown team category '{}'", slug);
            };
            let time = daily_time(at, stored)?;
            repo.set_category_player_schedule(slug, enabled, &time).await?;
        }
        ScheduleTarget::Profiles(slug) => {
            let rows = repo.profile_schedules().await?;
            let time = daily_time(at, stored_time(&rows, slug)?)?;
            repo.set_profile_schedule(slug, enabled, &time).await?;
        }
        ScheduleTarget::Series(slug) => {
            let rows = repo.series_schedules().await?;
            let time = daily_time(at, stored_time(&rows, slug)?)?;
            repo.set_series_schedule(slug, enabled, &time).await?;
        }
        ScheduleTarget::Matches => {
            let hours = every.unwrap_or(repo.match_setting().await?.interval_hours);
            anyhow::ensure!(hours > 0, "interval must be at least one hour");
            repo.set_match_schedule(enabled, hours).await?;
        }
        ScheduleTarget::Live => {
            let secs = every.unwrap_or(repo.live_setting().await?.interval_seconds);
            anyhow::ensure!(secs > 0, "interval must be at least one second");
            repo.set_live_schedule(enabled, secs).await?;
        }
    }
    Ok(())
}

fn switch(enabled: bool) -> console::StyledObject<&'static str> {
    if enabled {
        style("on ").green()
    } else {
        style("off").dim()
    }
}

fn last(value: Option<chrono::DateTime<chrono::Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string())
}

async fn show(ctx: &DbContext) -> anyhow::Result<()> {
    let repo = ctx.settings();
    let global = repo.scrape_setting().await?;

    println!("{}", style("Teams and rosters").bold());
    println!(
        "  {:<22} {} {}  last {}",
        "teams",
        switch(global.auto_scrape_enabled),
        global.scrape_time,
        last(global.last_scrape)
    );
    println!(
        "  {:<22} {} {}  last {}",
        "players",
        switch(global.player_auto_scrape_enabled),
        global.player_scrape_time,
        last(global.last_player_scrape)
    );
    for def in crate::models::TEAM_CATEGORIES {
        if let Some((enabled, at)) = global.category_players(def.slug) {
            println!(
                "  {:<22} {} {}",
                format!("players:{}", def.slug),
                switch(enabled),
                at
            );
        }
    }

    for (title, kind, rows) in [
        ("Profiles", "profiles", repo.profile_schedules().await?),
        ("Series", "series", repo.series_schedules().await?),
    ] {
        println!("{}", style(title).bold());
        for row in rows {
            println!(
                "  {:<22} {} {}  last {}",
                format!("{}:{}", kind, row.category_slug),
                switch(row.auto_scrape_enabled),
                row.scrape_time,
                last(row.last_scrape)
            );
        }
    }

    let matches = repo.match_setting().await?;
    let live = repo.live_setting().await?;
    println!("{}", style("Intervals").bold());
    println!(
        "  {:<22} {} every {}h  last {}",
        "matches",
        switch(matches.auto_scrape_enabled),
        matches.interval_hours,
        last(matches.last_scrape)
    );
    println!(
        "  {:<22} {} every {}s  last {}",
        "live",
        switch(live.auto_scrape_enabled),
        live.interval_seconds,
        last(live.last_scrape)
    );
    Ok(())
}

pub async fn cmd_settings(settings: &Settings, command: SettingsCommands) -> anyhow::Result<()> {
    let ctx = super::open_context(settings).await?;
    match command {
        SettingsCommands::Show => show(&ctx).await,
        SettingsCommands::Set {
            target,
            state,
            at,
            every,
        } => {
            let parsed = ScheduleTarget::parse(&target)?;
            let enabled = parse_switch(&state)?;
            apply(&ctx.settings(), &parsed, enabled, at.as_deref(), every).await?;
            println!(
                "{} {} schedule {}",
                style("✓").green(),
                target,
                if enabled { "enabled" } else { "disabled" }
            );
            Ok(())
        }
    }
}
