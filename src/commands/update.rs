//! Update command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::aggregator::{aggregate, render};
use crate::alerts::{AlertManager, AlertTypes};
use crate::config::Config;
use crate::error::HostmergeError;
use crate::estimate::estimate_size;
use crate::fetcher::Fetcher;
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::lists::load_domain_list;
use crate::logging::{cleanup_old_logs, days};
use crate::output::{digest, OutputWriter, WriteStatus};
use crate::stats::{RunOutcome, RunStatus};
use crate::utils::{format_count, format_count_with_separator};

/// Run the update command
///
/// `log_file` is the current run's log, spared by log cleanup.
pub async fn run(config: &Config, dry_run: bool, log_file: Option<&Path>) -> Result<()> {
    run_with_fs(config, real_fs(), dry_run, log_file).await
}

/// [`run`] over an arbitrary file system: log cleanup, pipeline, notification.
pub async fn run_with_fs<F: FileSystem + ?Sized>(
    config: &Config,
    fs: &F,
    dry_run: bool,
    log_file: Option<&Path>,
) -> Result<()> {
    if !dry_run {
        match cleanup_old_logs(&config.log_dir, days(config.max_log_age_days), log_file) {
            Ok(0) => {}
            Ok(n) => info!("Deleted {} old log files", n),
            Err(e) => warn!("Log cleanup failed: {:#}", e),
        }
    }

    info!("Updating hosts file...");
    if dry_run {
        info!("Dry-run mode: nothing will be written or sent");
    }

    let result = execute(config, fs, dry_run).await;

    if dry_run {
        let outcome = result?;
        print_summary(&outcome);
        return Ok(());
    }

    let alert_manager = if config.alerts.any_enabled() {
        match AlertManager::new(&config.alerts) {
            Ok(manager) => Some(manager),
            Err(e) => {
                warn!("Alerts disabled for this run: {:#}", e);
                None
            }
        }
    } else {
        debug!("No alert destination enabled");
        None
    };

    match result {
        Ok(outcome) => {
            print_summary(&outcome);
            if let Some(manager) = &alert_manager {
                manager.send(&AlertTypes::run_summary(&outcome)).await;
            }
            Ok(())
        }
        Err(e) => {
            error!("Update failed: {:#}", e);
            if let Some(manager) = &alert_manager {
                manager
                    .send(&AlertTypes::update_failed(&format!("{:#}", e)))
                    .await;
            }
            Err(e)
        }
    }
}

/// Run the pipeline: fetch, normalize, deduplicate, overlay, estimate, write.
///
/// In dry-run mode nothing is created or written; the outcome only reports
/// whether the output would change.
pub async fn execute<F: FileSystem + ?Sized>(
    config: &Config,
    fs: &F,
    dry_run: bool,
) -> Result<RunOutcome> {
    let allow = load_domain_list(fs, &config.allow_list_file, !dry_run)
        .context("Failed to load allow-list")?;
    let deny = load_domain_list(fs, &config.deny_list_file, !dry_run)
        .context("Failed to load deny-list")?;
    info!(
        "Allow-list: {} domains, deny-list: {} domains",
        allow.len(),
        deny.len()
    );

    if config.urls.is_empty() {
        warn!("No source URLs configured. Output will only contain deny-listed domains.");
    }

    let fetcher = Fetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;
    let results = fetcher.fetch_all(&config.urls).await;

    let failed_sources: Vec<(String, String)> = results
        .iter()
        .filter_map(|r| r.error.as_ref().map(|e| (r.url.clone(), e.clone())))
        .collect();

    if !results.is_empty() && failed_sources.len() == results.len() {
        error!("No lines fetched from any source!");
        if config.abort_if_all_sources_fail {
            return Err(HostmergeError::Network(format!(
                "all {} sources failed to download",
                results.len()
            ))
            .into());
        }
    }

    let lines = results
        .iter()
        .flat_map(|r| r.lines.iter().map(String::as_str));
    let aggregation = aggregate(lines, &allow, &deny, config.strict_normalization);

    info!(
        "Merged {} raw lines into {} entries ({} duplicates removed, {} malformed)",
        format_count(aggregation.raw_lines),
        format_count(aggregation.entries.len()),
        format_count(aggregation.duplicates_removed),
        aggregation.malformed
    );

    let size = estimate_size(
        aggregation.entries.len(),
        &config.size_estimate,
        config.max_allowed_kib,
    );
    info!(
        "Estimated size: {} KiB (limit {} KiB)",
        format_count_with_separator(size.kib),
        format_count_with_separator(size.ceiling_kib)
    );
    if size.exceeds_ceiling() {
        warn!(
            "Estimated size {} KiB exceeds the {} KiB limit",
            size.kib, size.ceiling_kib
        );
    }

    let content = render(&aggregation.entries);
    let content_digest = digest(content.as_bytes());
    debug!("Output sha256={}", content_digest);

    let writer = OutputWriter::new(fs, config.output_path());
    let status = if dry_run {
        RunStatus::DryRun {
            would_change: writer.has_changed(&content),
        }
    } else {
        match writer.write_if_changed(&content)? {
            WriteStatus::Updated => RunStatus::Updated,
            WriteStatus::Unchanged => RunStatus::Unchanged,
        }
    };

    Ok(RunOutcome {
        sources_total: results.len(),
        failed_sources,
        raw_lines: aggregation.raw_lines,
        malformed: aggregation.malformed,
        duplicates_removed: aggregation.duplicates_removed,
        overlay: aggregation.overlay,
        size,
        status,
        output_path: writer.path().to_path_buf(),
        digest: content_digest,
    })
}

fn print_summary(outcome: &RunOutcome) {
    println!();
    match outcome.status {
        RunStatus::Updated => println!(
            "[OK] {} entries written to {}",
            format_count_with_separator(outcome.total_entries() as u64),
            outcome.output_path.display()
        ),
        RunStatus::Unchanged => println!(
            "[OK] No changes detected ({} entries)",
            format_count_with_separator(outcome.total_entries() as u64)
        ),
        RunStatus::DryRun { would_change } => println!(
            "[DRY-RUN] {} entries, output {}",
            format_count_with_separator(outcome.total_entries() as u64),
            if would_change { "would change" } else { "unchanged" }
        ),
    }
    if outcome.all_sources_failed() {
        println!("[ERROR] No source could be downloaded; output holds only the deny-list");
    } else if !outcome.failed_sources.is_empty() {
        println!(
            "[WARN] {}/{} sources failed",
            outcome.failed_sources.len(),
            outcome.sources_total
        );
    }
    if outcome.size.exceeds_ceiling() {
        println!(
            "[WARN] Estimated size {} KiB exceeds the {} KiB limit",
            outcome.size.kib, outcome.size.ceiling_kib
        );
    }
}
