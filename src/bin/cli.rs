//! jobwatch CLI
//!
//! Single-pass entry point, meant to be run from cron or a CI schedule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jobwatch::{
    error::Result,
    models::Config,
    pipeline,
    storage::LocalStorage,
};

/// jobwatch - Job Listing Watcher
#[derive(Parser, Debug)]
#[command(
    name = "jobwatch",
    version,
    about = "Notifies about new job postings from tracked companies"
)]
struct Cli {
    /// Directory holding config.toml, the company list and the store
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch sources, notify about new postings, update the store (default)
    Run {
        /// Log what would be sent without sending or saving anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Replace unknown timestamps in the store with the current time
    Repair,

    /// Validate configuration and the company list
    Validate,

    /// Show dedup store info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.data_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path);
    config.apply_env();
    log::debug!("Loaded configuration from {}", config_path.display());

    match cli.command.unwrap_or(Command::Run { dry_run: false }) {
        Command::Run { dry_run } => {
            pipeline::run_watch(&config, &cli.data_dir, dry_run).await?;
        }

        Command::Repair => {
            let storage = LocalStorage::new(config.seen_path(&cli.data_dir));
            pipeline::run_repair(&storage).await?;
        }

        Command::Validate => {
            pipeline::run_validate(&config, &cli.data_dir).await?;
        }

        Command::Info => {
            log::info!("Data directory: {}", cli.data_dir.display());
            let storage = LocalStorage::new(config.seen_path(&cli.data_dir));
            pipeline::run_info(&storage).await?;
        }
    }

    Ok(())
}
