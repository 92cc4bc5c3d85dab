//! Change detection and persistence of the merged hosts file.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::HostmergeError;
use crate::fs_abstraction::{parent_dir, FileSystem};

/// Outcome of [`OutputWriter::write_if_changed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Updated,
    Unchanged,
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Writes the merged list to its output path, skipping identical content.
pub struct OutputWriter<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    path: PathBuf,
}

impl<'a, F: FileSystem + ?Sized> OutputWriter<'a, F> {
    pub fn new(fs: &'a F, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Digest of the currently persisted file, `None` if there is none.
    ///
    /// An unreadable file is treated as absent so the next write replaces it.
    pub fn existing_digest(&self) -> Option<String> {
        if !self.fs.exists(&self.path) {
            return None;
        }
        match self.fs.read(&self.path) {
            Ok(bytes) => Some(digest(&bytes)),
            Err(e) => {
                warn!("Cannot read previous output {:?}: {}", self.path, e);
                None
            }
        }
    }

    /// Whether `content` differs from what is on disk.
    pub fn has_changed(&self, content: &str) -> bool {
        self.existing_digest().as_deref() != Some(digest(content.as_bytes()).as_str())
    }

    /// Replace the output with `content` unless it is byte-identical.
    ///
    /// Any I/O failure is returned; the previous file is left in place.
    pub fn write_if_changed(&self, content: &str) -> Result<WriteStatus> {
        let new_digest = digest(content.as_bytes());

        if let Some(old_digest) = self.existing_digest() {
            debug!("Previous output sha256={} new sha256={}", old_digest, new_digest);
            if old_digest == new_digest {
                info!("No changes detected. Skipping file update.");
                return Ok(WriteStatus::Unchanged);
            }
        }

        let dir = parent_dir(&self.path);
        self.fs
            .create_dir_all(dir)
            .map_err(|e| HostmergeError::fs(dir, e))
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;

        self.fs
            .write_atomic(&self.path, content.as_bytes())
            .map_err(|e: io::Error| HostmergeError::fs(&self.path, e))
            .with_context(|| format!("Failed to write output file {:?}", self.path))?;

        info!("Saved output to {:?}", self.path);
        Ok(WriteStatus::Updated)
    }
}
