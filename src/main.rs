//! hostmerge - Hosts Blocklist Aggregator
//!
//! Merges remote hosts-format blocklists into one filtered, deduplicated file.

use anyhow::Result;
use clap::Parser;
use tracing::Level;

use hostmerge::cli::{Cli, Commands};
use hostmerge::commands::overrides::ListKind;
use hostmerge::config::Config;
use hostmerge::{commands, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Tokens may live in a .env file in the working directory
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    match cli.command {
        Commands::Update { dry_run } => {
            let config = Config::load(&cli.config)?;
            // Dry runs leave no trace on disk, log file included
            let log_dir = (!dry_run).then_some(config.log_dir.as_path());
            let log_file = logging::init(log_level, log_dir)?;
            commands::update::run(&config, dry_run, log_file.as_deref()).await
        }
        Commands::Version => {
            println!("hostmerge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            logging::init(log_level, None)?;
            match command {
                Commands::Check { domain } => commands::check::run(&domain, &cli.config),
                Commands::Allowlist { action } => {
                    commands::overrides::run(ListKind::Allow, action, &cli.config)
                }
                Commands::Denylist { action } => {
                    commands::overrides::run(ListKind::Deny, action, &cli.config)
                }
                Commands::Stats => commands::stats::run(&cli.config),
                Commands::Init { force } => commands::init::run(&cli.config, force),
                Commands::Update { .. } | Commands::Version => Ok(()),
            }
        }
    }
}
