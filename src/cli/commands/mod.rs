//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to
//! command-specific modules.

mod extract;
mod helpers;
mod historical;
mod init;
mod live;
mod runs;
mod weeks;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "odds")]
#[command(about = "NFL betting-lines acquisition pipeline")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to oddsacquire.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

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
    /// Initialize the data directory and audit database
    Init,

    /// Historical odds tables, one CSV per season
    Historical {
        #[command(subcommand)]
        command: HistoricalCommands,
    },

    /// Raw week-page archive
    Weeks {
        #[command(subcommand)]
        command: WeekCommands,
    },

    /// Game-reference extraction from archived week pages
    Extract {
        #[command(subcommand)]
        command: ExtractCommands,
    },

    /// Capture one live odds snapshot (placeholder selectors)
    Live {
        /// Print the snapshot without storing it
        #[arg(long)]
        dry_run: bool,
    },

    /// List recent pipeline runs
    Runs {
        /// Maximum number of runs to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum HistoricalCommands {
    /// Scrape seasons and upload their CSVs to the object store
    Scrape {
        /// Scrape a single year
        #[arg(short, long)]
        year: Option<i32>,
        /// Start year for a range
        #[arg(long, default_value = "1952")]
        from: i32,
        /// End year for a range
        #[arg(long, default_value = "2025")]
        to: i32,
        /// Parse and report without uploading
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Scrape one season's CSV to a local file
    Export {
        #[arg(short, long)]
        year: i32,
        /// Output path (defaults to the temp directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Dump a season page's raw HTML to stdout
    Dump {
        #[arg(short, long)]
        year: i32,
    },
}

#[derive(Subcommand)]
enum WeekCommands {
    /// Crawl week pages into the unprocessed archive
    Crawl {
        /// Crawl a single year
        #[arg(short, long)]
        year: Option<i32>,
        /// Start year for a range
        #[arg(long, default_value = "1952")]
        from: i32,
        /// End year for a range
        #[arg(long, default_value = "2025")]
        to: i32,
        /// Fetch and report without storing
        #[arg(short, long)]
        dry_run: bool,
        /// Cap the number of weeks fetched per season
        #[arg(long)]
        max_weeks: Option<u32>,
    },
}

#[derive(Subcommand)]
enum ExtractCommands {
    /// Extract game references from one archived week
    Week {
        #[arg(short, long)]
        year: i32,
        #[arg(short, long)]
        week: u32,
        /// Leave the unprocessed artifact in place
        #[arg(long)]
        keep_source: bool,
        /// Parse and report without writing or promoting
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Extract every archived week of one or more seasons
    Year {
        /// Extract a single year
        #[arg(short, long)]
        year: Option<i32>,
        /// Start year for a range
        #[arg(long, default_value = "1952")]
        from: i32,
        /// End year for a range
        #[arg(long, default_value = "2025")]
        to: i32,
        /// Leave the unprocessed artifacts in place
        #[arg(long)]
        keep_source: bool,
        /// Count references without writing or promoting
        #[arg(short, long)]
        dry_run: bool,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => init::run(&settings),
        Commands::Historical { command } => historical::run(&settings, command).await,
        Commands::Weeks { command } => weeks::run(&settings, command).await,
        Commands::Extract { command } => extract::run(&settings, command).await,
        Commands::Live { dry_run } => live::run(&settings, dry_run).await,
        Commands::Runs { limit } => runs::run(&settings, limit),
    }
}
