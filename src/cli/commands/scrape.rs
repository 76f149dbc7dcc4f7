//! On-demand scrape commands.

use console::style;

use super::ScrapeCommands;
use crate::cli::progress::follow;
use crate::config::Settings;
use crate::progress::ProgressRegistry;
use crate::services::{IngestJob, Ingestor};

fn job_for(command: ScrapeCommands) -> IngestJob {
    match command {
        ScrapeCommands::Teams { category: Some(slug) } => IngestJob::TeamCategory(slug),
        ScrapeCommands::Teams { category: None } => IngestJob::AllTeams,
        ScrapeCommands::Players { team: Some(id), .. } => IngestJob::TeamPlayers(id),
        ScrapeCommands::Players { team: None, category } => IngestJob::Players(category),
        ScrapeCommands::Profiles { category, all } => IngestJob::Profiles {
            category,
            only_missing: !all,
        },
        ScrapeCommands::Series { category } => IngestJob::Series(category),
        ScrapeCommands::Matches { url: Some(url) } => IngestJob::SeriesUrl(url),
        ScrapeCommands::Matches { url: None } => IngestJob::AllSeriesMatches,
        ScrapeCommands::Live => IngestJob::LiveScores,
        ScrapeCommands::Scorecard { match_id } => IngestJob::Match(match_id),
    }
}

/// Run one scrape in the foreground with a progress bar.
pub async fn cmd_scrape(settings: &Settings, command: ScrapeCommands) -> anyhow::Result<()> {
    let ctx = super::open_context(settings).await?;
    let ingestor = Ingestor::from_settings(settings, ctx, ProgressRegistry::new())?;

    let job = job_for(command);
    let key = job.progress_key();
    let runner = ingestor.clone();
    let task = tokio::spawn(async move { runner.run(&job).await });
    let outcome = follow(ingestor.progress(), &key, task).await?;

    if outcome.success {
        println!("{} {}", style("✓").green(), outcome.message);
        if outcome.counts.skipped > 0 {
            println!(
                "  {} {} records skipped for lacking an id",
                style("!").yellow(),
                outcome.counts.skipped
            );
        }
        Ok(())
    } else {
        println!("{} {}", style("✗").red(), outcome.message);
        anyhow::bail!("scrape failed")
    }
}
