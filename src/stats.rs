//! Run outcome and statistics display for hostmerge.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::path::PathBuf;

use crate::config::Config;
use crate::estimate::{estimate_size, SizeEstimate};
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::lists::load_domain_list;
use crate::overlay::OverlayReport;
use crate::utils::format_count_with_separator;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Updated,
    Unchanged,
    DryRun { would_change: bool },
}

/// Everything a single update run did, for logs and notifications
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub sources_total: usize,
    /// `(url, error)` for every source that contributed nothing
    pub failed_sources: Vec<(String, String)>,
    pub raw_lines: usize,
    pub malformed: usize,
    pub duplicates_removed: usize,
    pub overlay: OverlayReport,
    pub size: SizeEstimate,
    pub status: RunStatus,
    pub output_path: PathBuf,
    /// SHA-256 of the rendered output
    pub digest: String,
}

impl RunOutcome {
    pub fn total_entries(&self) -> usize {
        self.size.entries
    }

    /// At least one source was configured and none could be downloaded
    pub fn all_sources_failed(&self) -> bool {
        self.sources_total > 0 && self.failed_sources.len() == self.sources_total
    }

    /// Whether this run needs operator attention
    pub fn has_warnings(&self) -> bool {
        self.size.exceeds_ceiling() || !self.failed_sources.is_empty()
    }
}

/// Snapshot of the files an update run produces and consumes
#[derive(Debug, Clone, PartialEq)]
pub struct ListStats {
    /// `None` when no output has been written yet
    pub output_entries: Option<usize>,
    pub size: SizeEstimate,
    pub allow_count: usize,
    pub deny_count: usize,
}

/// Gather statistics without creating any file.
pub fn collect_stats<F: FileSystem + ?Sized>(config: &Config, fs: &F) -> Result<ListStats> {
    let output_path = config.output_path();
    let output_entries = if fs.exists(&output_path) {
        let content = fs.read_to_string(&output_path)?;
        Some(content.lines().filter(|l| !l.trim().is_empty()).count())
    } else {
        None
    };

    let allow = load_domain_list(fs, &config.allow_list_file, false)?;
    let deny = load_domain_list(fs, &config.deny_list_file, false)?;

    Ok(ListStats {
        output_entries,
        size: estimate_size(
            output_entries.unwrap_or(0),
            &config.size_estimate,
            config.max_allowed_kib,
        ),
        allow_count: allow.len(),
        deny_count: deny.len(),
    })
}

/// Display formatted statistics
pub fn display_stats(config: &Config) -> Result<()> {
    let stats = collect_stats(config, real_fs())?;
    let output_path = config.output_path();

    println!();
    println!("══════════════════════════════════════════════════════════════════");
    println!(" HOSTMERGE STATISTICS");
    println!("══════════════════════════════════════════════════════════════════");
    println!();

    println!(" Output file: {}", output_path.display());
    match stats.output_entries {
        Some(count) => println!(" Entries: {}", format_count_with_separator(count as u64)),
        None => println!(" Entries: (no output written yet)"),
    }

    let marker = if stats.size.exceeds_ceiling() { "  EXCEEDS LIMIT" } else { "" };
    println!(
        " Estimated size: {} KiB / {} KiB{}",
        format_count_with_separator(stats.size.kib),
        format_count_with_separator(stats.size.ceiling_kib),
        marker
    );
    println!();

    println!(" OVERRIDES");
    println!(" ────────────────────────────────────────────────────────────────");
    println!(
        " Allow-list: {} domains ({})",
        stats.allow_count,
        config.allow_list_file.display()
    );
    println!(
        " Deny-list:  {} domains ({})",
        stats.deny_count,
        config.deny_list_file.display()
    );
    println!(" Sources configured: {}", config.urls.len());
    println!();

    let modified = std::fs::metadata(&output_path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Local>::from);
    match modified {
        Some(ts) => println!(
            " Last update: {} ({})",
            ts.format("%Y-%m-%d %H:%M:%S"),
            format_duration_ago(ts)
        ),
        None => println!(" Last update: never"),
    }

    println!("══════════════════════════════════════════════════════════════════");
    println!();

    Ok(())
}

/// Format duration since a timestamp
fn format_duration_ago(dt: DateTime<Local>) -> String {
    let seconds = Local::now().signed_duration_since(dt).num_seconds();
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{}h ago", seconds / 3600)
    } else {
        format!("{}d ago", seconds / 86400)
    }
}
