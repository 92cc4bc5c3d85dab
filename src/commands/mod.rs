//! CLI command implementations.

pub mod check;
pub mod init;
pub mod overrides;
pub mod stats;
pub mod update;
