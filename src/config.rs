//! Configuration management for hostmerge.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::HostmergeError;
use crate::validation::{validate_alert_url, validate_source_url};

/// Upper bound for the per-request fetch timeout
const MAX_FETCH_TIMEOUT_SECS: u64 = 600;

/// Upper bound for log retention (100 years)
const MAX_LOG_AGE_DAYS: u64 = 36_500;

/// Default Telegram Bot API endpoint
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Secure string type that zeroizes memory on drop
/// Used for bot tokens and other credentials
#[derive(Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecureString(String);

impl SecureString {
    pub fn new(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Resolve a credential: custom env var, then default env var, then the config value.
fn resolve_secret(custom_env: Option<&str>, default_env: &str, fallback: &SecureString) -> SecureString {
    if let Some(name) = custom_env {
        if let Ok(val) = env::var(name) {
            return SecureString::new(val);
        }
    }
    if let Ok(val) = env::var(default_env) {
        return SecureString::new(val);
    }
    fallback.clone()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory receiving one log file per run
    pub log_dir: PathBuf,

    /// Log files older than this many days are deleted at run start
    pub max_log_age_days: u64,

    /// Output path without extension; `.txt` is appended
    pub output_file_base: PathBuf,

    /// Domains never written to the output
    #[serde(alias = "white_list_file")]
    pub allow_list_file: PathBuf,

    /// Domains always written to the output
    #[serde(alias = "black_list_file")]
    pub deny_list_file: PathBuf,

    /// Warn when the estimated resolver cache footprint exceeds this (KiB)
    pub max_allowed_kib: u64,

    /// Remote hosts-format lists
    pub urls: Vec<String>,

    /// Per-request timeout for source downloads
    pub fetch_timeout_secs: u64,

    /// Reject lines that are not exactly `0.0.0.0 <domain>` after prefixing
    pub strict_normalization: bool,

    /// Fail the run instead of writing a deny-list-only file when no source downloads
    pub abort_if_all_sources_fail: bool,

    /// Constants of the size estimator
    pub size_estimate: SizeEstimateConfig,

    /// Alert destinations
    pub alerts: AlertsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            max_log_age_days: 7,
            output_file_base: PathBuf::from("hosts"),
            allow_list_file: PathBuf::from("allowlist.txt"),
            deny_list_file: PathBuf::from("denylist.txt"),
            max_allowed_kib: 10_240,
            urls: Vec::new(),
            fetch_timeout_secs: 30,
            strict_normalization: true,
            abort_if_all_sources_fail: false,
            size_estimate: SizeEstimateConfig::default(),
            alerts: AlertsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML (or JSON) file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| HostmergeError::fs(path, e))
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| HostmergeError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        for url in &self.urls {
            validate_source_url(url)?;
        }

        if self.fetch_timeout_secs == 0 || self.fetch_timeout_secs > MAX_FETCH_TIMEOUT_SECS {
            return Err(HostmergeError::Config(format!(
                "Invalid fetch_timeout_secs {}. Must be between 1 and {}",
                self.fetch_timeout_secs, MAX_FETCH_TIMEOUT_SECS
            ))
            .into());
        }

        if self.max_log_age_days > MAX_LOG_AGE_DAYS {
            return Err(HostmergeError::Config(format!(
                "Invalid max_log_age_days {}. Must be at most {}",
                self.max_log_age_days, MAX_LOG_AGE_DAYS
            ))
            .into());
        }

        self.size_estimate.validate()?;

        if self.output_file_base.as_os_str().is_empty() {
            return Err(HostmergeError::Config("output_file_base cannot be empty".into()).into());
        }

        let telegram = &self.alerts.telegram;
        if telegram.enabled {
            validate_alert_url("Telegram API", &telegram.api_url)?;
        }

        if self.alerts.gotify.enabled && !self.alerts.gotify.url.is_empty() {
            validate_alert_url("Gotify", &self.alerts.gotify.url)?;
        }

        if self.alerts.webhook.enabled && !self.alerts.webhook.url.is_empty() {
            validate_alert_url("Webhook", &self.alerts.webhook.url)?;
        }

        Ok(())
    }

    /// Full path of the merged hosts file (`<output_file_base>.txt`)
    pub fn output_path(&self) -> PathBuf {
        let mut name: OsString = self.output_file_base.clone().into_os_string();
        name.push(".txt");
        PathBuf::from(name)
    }

    /// Generate default config with comments
    pub fn generate_default_yaml() -> String {
        include_str!("../templates/config.yaml").to_string()
    }
}

/// Constants used by [`crate::estimate::estimate_size`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SizeEstimateConfig {
    /// Approximate resolver memory per entry (KiB)
    pub kib_per_entry: f64,
    /// Safety margin multiplier
    pub buffer_factor: f64,
}

impl Default for SizeEstimateConfig {
    fn default() -> Self {
        Self {
            kib_per_entry: 0.112133,
            buffer_factor: 1.05,
        }
    }
}

impl SizeEstimateConfig {
    fn validate(&self) -> Result<(), HostmergeError> {
        for (name, value) in [
            ("kib_per_entry", self.kib_per_entry),
            ("buffer_factor", self.buffer_factor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(HostmergeError::Config(format!(
                    "size_estimate.{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AlertsConfig {
    pub telegram: TelegramConfig,
    pub gotify: GotifyConfig,
    pub webhook: WebhookConfig,
}

impl AlertsConfig {
    /// Whether at least one destination is switched on
    pub fn any_enabled(&self) -> bool {
        self.telegram.enabled || self.gotify.enabled || self.webhook.enabled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    /// Bot API base URL, overridable for self-hosted Bot API servers
    pub api_url: String,
    /// Token can be set directly or via TELEGRAM_BOT_TOKEN env var
    pub bot_token: SecureString,
    pub bot_token_env: Option<String>,
    /// Chat id can be set directly or via TELEGRAM_CHAT_ID env var
    pub chat_id: String,
    pub chat_id_env: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: TELEGRAM_API_URL.to_string(),
            bot_token: SecureString::default(),
            bot_token_env: None,
            chat_id: String::new(),
            chat_id_env: None,
        }
    }
}

impl TelegramConfig {
    /// Get the effective bot token, checking env vars first
    pub fn get_token(&self) -> SecureString {
        resolve_secret(self.bot_token_env.as_deref(), "TELEGRAM_BOT_TOKEN", &self.bot_token)
    }

    /// Get the effective chat id, checking env vars first
    pub fn get_chat_id(&self) -> String {
        let fallback = SecureString::from(self.chat_id.as_str());
        resolve_secret(self.chat_id_env.as_deref(), "TELEGRAM_CHAT_ID", &fallback)
            .as_str()
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GotifyConfig {
    pub enabled: bool,
    pub url: String,
    /// Token can be set directly or via HOSTMERGE_GOTIFY_TOKEN env var
    pub token: SecureString,
    pub token_env: Option<String>,
}

impl GotifyConfig {
    /// Get the effective token, checking env vars first
    pub fn get_token(&self) -> SecureString {
        resolve_secret(self.token_env.as_deref(), "HOSTMERGE_GOTIFY_TOKEN", &self.token)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WebhookConfig {
    pub enabled: bool,
    pub url: String,
    #[serde(deserialize_with = "deserialize_headers")]
    pub headers: HashMap<String, String>,
}

/// Deserialize and validate HTTP headers (reject injection attempts)
fn deserialize_headers<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let headers: HashMap<String, String> = HashMap::deserialize(deserializer)?;

    for (key, value) in &headers {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(serde::de::Error::custom(format!(
                "Invalid header name '{}': only ASCII letters, digits, '-' and '_' allowed",
                key.escape_debug()
            )));
        }
        if value.chars().any(|c| c == '\r' || c == '\n' || c == '\0') {
            return Err(serde::de::Error::custom(format!(
                "Invalid header value for '{}': contains control characters",
                key
            )));
        }
    }

    Ok(headers)
}
