//! Initialize command.

use console::style;

use crate::config::Settings;
use crate::repository::util::redact_url_password;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    let ctx = super::open_context(settings).await?;
    let categories = ctx.teams().categories().await?;
    let series_categories = ctx.series().categories().await?;

    println!(
        "{} Initialized crease in {}",
        style("✓").green(),
        settings.data_dir.display()
    );
    println!(
        "  Database: {}",
        redact_url_password(&settings.database_url())
    );
    println!(
        "  {} team categories, {} series categories; every schedule starts disabled",
        categories.len(),
        series_categories.len()
    );
    Ok(())
}
