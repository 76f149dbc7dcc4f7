//! Database management commands.

use console::style;

use crate::config::Settings;
use crate::repository::util::redact_url_password;
use crate::repository::ClearTarget;

/// Print row counts.
pub async fn cmd_stats(settings: &Settings) -> anyhow::Result<()> {
    let ctx = super::open_context(settings).await?;
    let counts = ctx.counts().await?;

    println!("{}", style("Dataset").bold());
    println!(
        "  Database: {}",
        redact_url_password(&settings.database_url())
    );
    println!("  {:<18} {:>8}", "Teams", counts.teams);
    println!(
        "  {:<18} {:>8} ({} with profiles)",
        "Players", counts.players, counts.profiles_scraped
    );
    println!("  {:<18} {:>8}", "Series", counts.series);
    println!(
        "  {:<18} {:>8} ({} live)",
        "Matches", counts.matches, counts.live_matches
    );
    println!("  {:<18} {:>8}", "Scrape log rows", counts.scrape_logs);
    Ok(())
}

/// Delete every row of one entity kind.
pub async fn cmd_clear(settings: &Settings, target: &str, yes: bool) -> anyhow::Result<()> {
    let Some(target) = ClearTarget::from_str(target) else {
        anyhow::bail!(
            "unknown clear target '{}' (expected matches, series, players, teams or all)",
            target
        );
    };
    if !yes {
        println!(
            "{} This deletes every stored {}. Re-run with --yes to confirm.",
            style("!").yellow(),
            target.as_str()
        );
        return Ok(());
    }

    let ctx = super::open_context(settings).await?;
    let removed = ctx.clear(target).await?;
    println!(
        "{} Removed {} {} rows",
        style("✓").green(),
        removed,
        target.as_str()
    );
    if matches!(target, ClearTarget::Teams) {
        println!("  Players of those teams were removed with them");
    }
    Ok(())
}
