//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod daemon;
mod db;
mod init;
mod logs;
mod scrape;
mod settings_cmd;
mod show;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, Settings};
use crate::repository::DbContext;

#[derive(Parser)]
#[command(name = "crease")]
#[command(about = "Cricket data acquisition and scheduling")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./crease.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config and environment)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Database URL (overrides config and environment)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, schema and seed rows
    Init,

    /// Run a scrape now
    Scrape {
        #[command(subcommand)]
        command: ScrapeCommands,
    },

    /// Show stored teams, players, series and matches
    Show {
        #[command(subcommand)]
        command: ShowCommands,
    },

    /// View or change scrape schedules
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Show recent scrape log entries
    Logs {
        /// Only entries with this category tag (e.g. auto_daily, players:women)
        #[arg(long)]
        category: Option<String>,
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Database management
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },

    /// Run the scheduler until interrupted
    Daemon,
}

#[derive(Subcommand)]
pub(crate) enum ScrapeCommands {
    /// Teams of one category, or of every category when omitted
    Teams {
        /// Team category slug (international, domestic, league, women)
        category: Option<String>,
    },
    /// Player rosters
    Players {
        /// Only this team (provider team id)
        #[arg(long, conflicts_with = "category")]
        team: Option<String>,
        /// Only teams of this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Player profiles of a team category
    Profiles {
        category: String,
        /// Re-scrape players whose profile is already stored
        #[arg(long)]
        all: bool,
    },
    /// Series listing of a series category
    Series {
        /// Series category slug (all, international, domestic, league, women)
        category: String,
    },
    /// Matches of every stored series, or of one series page
    Matches {
        /// Series page URL
        #[arg(long)]
        url: Option<String>,
    },
    /// The live-score board
    Live,
    /// One match scorecard
    Scorecard {
        /// Provider match id
        match_id: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum ShowCommands {
    /// Team and series categories
    Categories,
    /// Teams of a category
    Teams { category: String },
    /// Players of a team (provider team id)
    Players { team: String },
    /// Series of a category
    Series { category: String },
    /// Matches, by state or by series
    Matches {
        /// Upcoming, Live, Innings Break or Complete
        #[arg(long, conflicts_with = "series")]
        state: Option<String>,
        /// Provider series id
        #[arg(long)]
        series: Option<String>,
        #[arg(short, long, default_value = "25")]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub(crate) enum SettingsCommands {
    /// Show every schedule
    Show,
    /// Enable or disable a schedule
    Set {
        /// teams, players, players:<slug>, profiles:<slug>, series:<slug>, matches or live
        target: String,
        /// on or off
        state: String,
        /// Daily time as HH:MM (daily schedules)
        #[arg(long)]
        at: Option<String>,
        /// Interval in hours for matches, seconds for live
        #[arg(long)]
        every: Option<i32>,
    },
}

#[derive(Subcommand)]
pub(crate) enum DbCommands {
    /// Row counts
    Stats,
    /// Delete every row of one entity kind
    Clear {
        /// matches, series, players, teams or all
        target: String,
        /// Skip the confirmation guard
        #[arg(long)]
        yes: bool,
    },
}

fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    if let Some(url) = &cli.database_url {
        settings.database_url = Some(url.clone());
    }
}

/// Open the database, creating schema and seed rows when missing.
async fn open_context(settings: &Settings) -> anyhow::Result<DbContext> {
    settings.ensure_directories()?;
    let ctx = settings.create_db_context();
    ctx.initialize(&settings.base_url).await?;
    Ok(ctx)
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    apply_overrides(&mut settings, &cli);
    tracing::debug!("Resolved settings: {:?}", settings);

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Scrape { command } => scrape::cmd_scrape(&settings, command).await,
        Commands::Show { command } => show::cmd_show(&settings, command).await,
        Commands::Settings { command } => settings_cmd::cmd_settings(&settings, command).await,
        Commands::Logs { category, limit } => {
            logs::cmd_logs(&settings, category.as_deref(), limit).await
        }
        Commands::Db { command } => match command {
            DbCommands::Stats => db::cmd_stats(&settings).await,
            DbCommands::Clear { target, yes } => db::cmd_clear(&settings, &target, yes).await,
        },
        Commands::Daemon => daemon::cmd_daemon(&settings).await,
    }
}
