//! Console and per-run file logging.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tracing::{debug, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::error::HostmergeError;

const LOG_PREFIX: &str = "log_";
const LOG_SUFFIX: &str = ".log";

/// `log_YYYY-MM-DD_HH-MM-SS.log`
pub fn log_file_name(at: DateTime<Local>) -> String {
    format!("{}{}{}", LOG_PREFIX, at.format("%Y-%m-%d_%H-%M-%S"), LOG_SUFFIX)
}

/// Install the global subscriber.
///
/// The console layer honours `level`. With a `log_dir` a file layer is added
/// that records at least INFO; the path of the new log file is returned.
pub fn init(level: Level, log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let console = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .with_filter(LevelFilter::from_level(level));

    let (file_layer, log_path) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .map_err(|e| HostmergeError::fs(dir, e))
                .context("Failed to create log directory")?;
            let path = dir.join(log_file_name(Local::now()));
            let file = File::create(&path)
                .map_err(|e| HostmergeError::fs(&path, e))
                .context("Failed to create log file")?;

            let file_level = if level == Level::DEBUG || level == Level::TRACE {
                level
            } else {
                Level::INFO
            };
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::from_level(file_level));
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(log_path)
}

/// Delete `log_*.log` files in `dir` older than `max_age`.
///
/// `keep` is never deleted. Returns how many files were removed; a missing
/// directory is not an error.
pub fn cleanup_old_logs(dir: &Path, max_age: Duration, keep: Option<&Path>) -> Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(HostmergeError::fs(dir, e).into()),
    };

    let now = SystemTime::now();
    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| HostmergeError::fs(dir, e))?;
        let path = entry.path();

        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(LOG_PREFIX) && n.ends_with(LOG_SUFFIX))
            .unwrap_or(false);
        if !is_log || keep == Some(path.as_path()) {
            continue;
        }

        let metadata = entry.metadata().map_err(|e| HostmergeError::fs(&path, e))?;
        if !metadata.is_file() {
            continue;
        }

        // Modification times in the future count as fresh
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age > max_age {
            fs::remove_file(&path).map_err(|e| HostmergeError::fs(&path, e))?;
            debug!("Deleted old log file {:?}", path);
            removed += 1;
        }
    }

    Ok(removed)
}

/// `days` as a [`Duration`]
pub fn days(days: u64) -> Duration {
    Duration::from_secs(days.saturating_mul(24 * 60 * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, age: Duration) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
        path
    }

    #[test]
    fn test_log_file_name() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(log_file_name(at), "log_2024-03-09_07-05-01.log");
    }

    #[test]
    fn test_cleanup_removes_only_old_logs() {
        let dir = TempDir::new().unwrap();
        let old = touch(dir.path(), "log_2020-01-01_00-00-00.log", days(30));
        let fresh = touch(dir.path(), "log_2099-01-01_00-00-00.log", days(1));
        let other = touch(dir.path(), "notes.txt", days(30));

        let removed = cleanup_old_logs(dir.path(), days(7), None).unwrap();
        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(other.exists());
    }

    #[test]
    fn test_cleanup_keeps_current_log() {
        let dir = TempDir::new().unwrap();
        let current = touch(dir.path(), "log_current.log", days(30));

        let removed = cleanup_old_logs(dir.path(), days(7), Some(&current)).unwrap();
        assert_eq!(removed, 0);
        assert!(current.exists());
    }

    #[test]
    fn test_cleanup_zero_age_removes_every_older_log() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "log_a.log", Duration::from_secs(10));
        touch(dir.path(), "log_b.log", Duration::from_secs(20));

        assert_eq!(cleanup_old_logs(dir.path(), Duration::ZERO, None).unwrap(), 2);
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = TempDir::new().unwrap();
        let removed = cleanup_old_logs(&dir.path().join("absent"), days(7), None).unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_days() {
        assert_eq!(days(0), Duration::ZERO);
        assert_eq!(days(7).as_secs(), 604_800);
        assert_eq!(days(u64::MAX).as_secs(), u64::MAX);
        assert_eq!(days(300_000_000_000_000).as_secs(), u64::MAX);
    }
}
