//! Scrape log listing.

use console::style;

use crate::config::Settings;
use crate::models::LogStatus;

pub async fn cmd_logs(settings: &Settings, category: Option<&str>, limit: i64) -> anyhow::Result<()> {
    let ctx = super::open_context(settings).await?;
    let entries = ctx.logs().recent(category, limit.max(1)).await?;

    if entries.is_empty() {
        println!("{} No scrape log entries", style("!").yellow());
        return Ok(());
    }

    for entry in entries {
        let status = match entry.status {
            LogStatus::Success => style("ok ").green(),
            LogStatus::Error => style("err").red(),
        };
        println!(
            "{} {} {:<20} {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            status,
            entry.category.as_deref().unwrap_or("-"),
            entry.message.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
