//! Long-running scheduler process.

use console::style;
use tokio::sync::watch;
use tracing::info;

use crate::config::Settings;
use crate::progress::ProgressRegistry;
use crate::scheduler::Scheduler;
use crate::services::Ingestor;

/// Run scheduled scrapes until Ctrl-C.
pub async fn cmd_daemon(settings: &Settings) -> anyhow::Result<()> {
    let ctx = super::open_context(settings).await?;
    let ingestor = Ingestor::from_settings(settings, ctx, ProgressRegistry::new())?;
    let scheduler = Scheduler::new(ingestor);

    let poll = settings.settings_poll_interval();
    println!(
        "{} Scheduler running (settings checked every {}s, Ctrl-C to stop)",
        style("→").cyan(),
        poll.as_secs()
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    let runner = tokio::spawn(scheduler.run(poll, stop_rx));

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received, stopping scheduler");
    let _ = stop_tx.send(true);
    runner.await?;

    println!("{} Scheduler stopped", style("✓").green());
    Ok(())
}
