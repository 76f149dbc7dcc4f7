//! Read-only views of the stored dataset.

use console::style;

use super::ShowCommands;
use crate::config::Settings;
use crate::models::{Match, MatchState};

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn print_match(m: &Match) {
    println!(
        "  {:<10} {:<13} {} v {}  {} / {}  {}",
        m.match_id,
        m.state.as_str(),
        or_dash(&m.team1_name),
        or_dash(&m.team2_name),
        or_dash(&m.team1_score),
        or_dash(&m.team2_score),
        m.result.as_deref().or(m.live_status.as_deref()).unwrap_or("")
    );
}

pub async fn cmd_show(settings: &Settings, command: ShowCommands) -> anyhow::Result<()> {
    let ctx = super::open_context(settings).await?;

    match command {
        ShowCommands::Categories => {
            println!("{}", style("Team categories").bold());
            for c in ctx.teams().categories().await? {
                println!("  {:<15} {}", c.slug, c.name);
            }
            println!("{}", style("Series categories").bold());
            for c in ctx.series().categories().await? {
                println!("  {:<15} {}", c.slug, c.name);
            }
        }
        ShowCommands::Teams { category } => {
            let teams = ctx.teams().by_category(&category).await?;
            println!("{} ({} teams)", style(&category).bold(), teams.len());
            for t in teams {
                println!(
                    "  {:<8} {:<30} {}",
                    t.team_id,
                    t.name,
                    or_dash(&t.short_name)
                );
            }
        }
        ShowCommands::Players { team } => {
            let Some(found) = ctx.teams().get_by_provider_id(&team).await? else {
                anyhow::bail!("team {} not found", team);
            };
            let players = ctx.players().by_team(found.id).await?;
            println!("{} ({} players)", style(&found.name).bold(), players.len());
            for p in players {
                let marker = if p.profile_scraped { "*" } else { " " };
                println!(
                    "  {:<8} {}{:<30} {}",
                    p.player_id,
                    marker,
                    p.name,
                    or_dash(&p.role)
                );
            }
        }
        ShowCommands::Series { category } => {
            let series = ctx.series().by_category(&category).await?;
            println!("{} ({} series)", style(&category).bold(), series.len());
            for s in series {
                println!(
                    "  {:<8} {:<50} {}",
                    s.series_id,
                    s.name,
                    s.start_date.as_deref().or(s.date_range.as_deref()).unwrap_or("-")
                );
            }
        }
        ShowCommands::Matches {
            state,
            series,
            limit,
        } => {
            let matches = match (state, series) {
                (Some(raw), _) => {
                    let Some(state) = MatchState::from_str(&raw) else {
                        anyhow::bail!("unknown match state '{}'", raw);
                    };
                    ctx.matches().by_state(state, limit).await?
                }
                (None, Some(series_id)) => ctx.matches().by_series(&series_id).await?,
                (None, None) => ctx.matches().recent(limit).await?,
            };
            if matches.is_empty() {
                println!("{} No matches stored", style("!").yellow());
            }
            for m in &matches {
                print_match(m);
            }
        }
    }
    Ok(())
}
