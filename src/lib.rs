//! # hostmerge - Hosts Blocklist Aggregator
//!
//! Downloads several hosts-format domain blocklists, merges them into a single
//! deduplicated `0.0.0.0 <domain>` file and keeps it in sync with local
//! allow/deny overrides.
//!
//! ## Features
//!
//! - **Concurrent Fetching** - All sources are downloaded in parallel; a failing source never aborts the run
//! - **Normalization** - Every line is rendered in the canonical `0.0.0.0 <domain>` form
//! - **Order-Preserving Dedup** - First occurrence wins, output is deterministic
//! - **Overrides** - Allow-listed domains are removed, deny-listed domains are always present
//! - **Size Estimate** - Warns before a list outgrows the resolver cache budget
//! - **Change Detection** - SHA-256 comparison; identical output is never rewritten
//! - **Alerting** - Telegram, Gotify and webhook notifications
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        hostmerge                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: update, check, allowlist, denylist, stats  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls, join_all)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Aggregator                                                 │
//! │    ├── normalize → deduplicate                              │
//! │    └── Overlay: allow-list removal, deny-list addition      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Estimate → Output (sha2 change detection, atomic write)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Alerts (AlertChannel trait)                                │
//! │    └── Telegram, Gotify, webhook                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use hostmerge::aggregator::{aggregate, render};
//! use hostmerge::config::Config;
//! use hostmerge::fetcher::Fetcher;
//! use hostmerge::fs_abstraction::real_fs;
//! use hostmerge::lists::load_domain_list;
//! use hostmerge::output::OutputWriter;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!
//!     let fetcher = Fetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;
//!     let results = fetcher.fetch_all(&config.urls).await;
//!
//!     let allow = load_domain_list(real_fs(), &config.allow_list_file, true)?;
//!     let deny = load_domain_list(real_fs(), &config.deny_list_file, true)?;
//!     let lines = results.iter().flat_map(|r| r.lines.iter().map(String::as_str));
//!     let merged = aggregate(lines, &allow, &deny, config.strict_normalization);
//!
//!     OutputWriter::new(real_fs(), config.output_path()).write_if_changed(&render(&merged.entries))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`aggregator`] - Line normalization, deduplication and the merge pipeline
//! - [`alerts`] - Alert destinations (Telegram, Gotify, webhook)
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`error`] - Typed error classes
//! - [`estimate`] - Resolver cache size estimate
//! - [`fetcher`] - HTTP client for downloading source lists
//! - [`fs_abstraction`] - Mockable filesystem access
//! - [`lists`] - Allow/deny override files
//! - [`logging`] - Console and per-run file logging
//! - [`output`] - Change detection and atomic output writes
//! - [`overlay`] - Allow/deny overlay
//! - [`stats`] - Run outcome and statistics
//! - [`utils`] - Common utility functions (formatting, truncation)
//! - [`validation`] - Domain and URL validation

pub mod aggregator;
pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod estimate;
pub mod fetcher;
pub mod fs_abstraction;
pub mod lists;
pub mod logging;
pub mod output;
pub mod overlay;
pub mod stats;
pub mod utils;
pub mod validation;

pub use cli::{Cli, Commands, ListAction};
pub use config::Config;
pub use error::HostmergeError;
