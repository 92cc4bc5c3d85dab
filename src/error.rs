//! Error types for hostmerge.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostmergeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("File system error at {path:?}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl HostmergeError {
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }
}
