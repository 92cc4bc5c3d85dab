//! Alert system for hostmerge (Telegram, Gotify, webhook).

mod gotify;
mod telegram;
mod webhook;

pub use gotify::GotifyChannel;
pub use telegram::{escape_markdown, TelegramChannel};
pub use webhook::WebhookChannel;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AlertsConfig;
use crate::stats::{RunOutcome, RunStatus};
use crate::utils::{format_count_with_separator, redact_url};

/// Timeout for alert HTTP requests (30s for slow networks)
const TIMEOUT_SECS: u64 = 30;

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Info => "INFO",
            AlertLevel::Warning => "WARNING",
            AlertLevel::Error => "ERROR",
        }
    }

    pub fn gotify_priority(&self) -> u8 {
        match self {
            AlertLevel::Info => 2,
            AlertLevel::Warning => 5,
            AlertLevel::Error => 8,
        }
    }
}

/// A message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
}

/// A notification destination.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Human-readable channel name for logs
    fn name(&self) -> &'static str;

    /// Deliver one alert. Errors must not contain credentials.
    async fn send(&self, client: &Client, alert: &Alert) -> Result<()>;
}

/// Fans an alert out to every enabled channel
pub struct AlertManager {
    client: Client,
    channels: Vec<Box<dyn AlertChannel>>,
}

impl AlertManager {
    /// Build the manager from config; disabled channels are skipped
    pub fn new(config: &AlertsConfig) -> Result<Self> {
        let mut channels: Vec<Box<dyn AlertChannel>> = Vec::new();
        if config.telegram.enabled {
            channels.push(Box::new(TelegramChannel::from_config(&config.telegram)));
        }
        if config.gotify.enabled {
            channels.push(Box::new(GotifyChannel::from_config(&config.gotify)));
        }
        if config.webhook.enabled {
            channels.push(Box::new(WebhookChannel::from_config(&config.webhook)));
        }

        Self::with_channels(channels)
    }

    /// Manager with an explicit channel set
    pub fn with_channels(channels: Vec<Box<dyn AlertChannel>>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client for alerts")?;
        Ok(Self { client, channels })
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Send an alert to all configured destinations.
    ///
    /// Returns how many channels accepted it. Failures are logged, never returned.
    pub async fn send(&self, alert: &Alert) -> usize {
        let mut delivered = 0;
        for channel in &self.channels {
            match channel.send(&self.client, alert).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!("{} alert failed: {:#}", channel.name(), e),
            }
        }

        if !self.channels.is_empty() {
            debug!(
                "Alert sent to {}/{} destinations",
                delivered,
                self.channels.len()
            );
        }
        delivered
    }
}

/// Alert types for common events
pub struct AlertTypes;

impl AlertTypes {
    /// Summary of a finished update run
    pub fn run_summary(outcome: &RunOutcome) -> Alert {
        let level = if outcome.all_sources_failed() {
            AlertLevel::Error
        } else if outcome.has_warnings() {
            AlertLevel::Warning
        } else {
            AlertLevel::Info
        };

        let title = match outcome.status {
            RunStatus::Updated => "Hosts file updated",
            RunStatus::Unchanged => "No changes detected",
            RunStatus::DryRun { .. } => "Dry run completed",
        };

        let mut body = String::new();
        match outcome.status {
            RunStatus::Updated => {
                body.push_str(&format!("File: {}\n", outcome.output_path.display()));
            }
            RunStatus::Unchanged => {
                body.push_str(&format!(
                    "File update skipped: {}\n",
                    outcome.output_path.display()
                ));
            }
            RunStatus::DryRun { would_change } => {
                let verdict = if would_change { "would change" } else { "would not change" };
                body.push_str(&format!("File {}: {}\n", verdict, outcome.output_path.display()));
            }
        }
        body.push_str(&format!(
            "Total lines: {}\n",
            format_count_with_separator(outcome.total_entries() as u64)
        ));
        body.push_str(&format!(
            "Estimated size: {} KiB (limit {} KiB)\n",
            format_count_with_separator(outcome.size.kib),
            format_count_with_separator(outcome.size.ceiling_kib)
        ));
        body.push_str(&format!("Duplicates removed: {}\n", outcome.duplicates_removed));
        body.push_str(&format!(
            "Allow-list removals: {}\n",
            outcome.overlay.allow_removed.len()
        ));
        body.push_str(&format!(
            "Deny-list additions: {}\n",
            outcome.overlay.deny_added.len()
        ));

        if !outcome.overlay.deny_invalid.is_empty() {
            body.push_str(&format!(
                "Invalid deny-list entries skipped: {}\n",
                outcome.overlay.deny_invalid.join(", ")
            ));
        }

        if !outcome.failed_sources.is_empty() {
            body.push_str(&format!(
                "Failed sources: {}/{}\n",
                outcome.failed_sources.len(),
                outcome.sources_total
            ));
            for (url, error) in &outcome.failed_sources {
                body.push_str(&format!("  {}: {}\n", redact_url(url), error));
            }
        }

        if outcome.all_sources_failed() {
            body.push_str("ERROR: no source could be downloaded, output holds only the deny-list\n");
        }

        if outcome.size.exceeds_ceiling() {
            body.push_str(&format!(
                "WARNING: estimated size exceeds the {} KiB limit\n",
                outcome.size.ceiling_kib
            ));
        }

        Alert {
            level,
            title: title.to_string(),
            message: body.trim_end().to_string(),
        }
    }

    /// Alert for a run that aborted before writing
    pub fn update_failed(error: &str) -> Alert {
        Alert {
            level: AlertLevel::Error,
            title: "Hosts update failed".to_string(),
            message: format!("The hosts file was not updated:\n{}", error),
        }
    }
}
