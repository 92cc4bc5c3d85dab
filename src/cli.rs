//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hostmerge")]
#[command(author, version, about = "Merge remote hosts-format blocklists into one file")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    pub config: PathBuf,

    /// Quiet mode (for cron/systemd timer)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch sources, merge them and rewrite the output if it changed
    Update {
        /// Dry-run mode: fetch and process but don't write or notify
        #[arg(long)]
        dry_run: bool,
    },

    /// Check whether a domain is valid, overridden or present in the output
    Check {
        /// Domain to check
        domain: String,
    },

    /// Manage the allow-list (domains always removed)
    Allowlist {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Manage the deny-list (domains always present)
    Denylist {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Show output and override statistics
    Stats,

    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Show version
    Version,
}

#[derive(Subcommand, Clone)]
pub enum ListAction {
    /// Add a domain
    Add {
        /// Domain to add
        domain: String,
    },
    /// Remove a domain
    Del {
        /// Domain to remove
        domain: String,
    },
    /// List domains
    List,
}
