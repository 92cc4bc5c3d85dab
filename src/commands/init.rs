//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::error::HostmergeError;
use crate::fs_abstraction::{parent_dir, real_fs, FileSystem};

/// Write the commented default config to `config_path`
pub fn run(config_path: &Path, force: bool) -> Result<()> {
    write_default_config(real_fs(), config_path, force)?;
    println!("[OK] Default config written to {}", config_path.display());
    println!("     Edit the 'urls' list, then run 'hostmerge update'");
    Ok(())
}

pub fn write_default_config<F: FileSystem + ?Sized>(fs: &F, path: &Path, force: bool) -> Result<()> {
    if fs.exists(path) && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let dir = parent_dir(path);
    fs.create_dir_all(dir)
        .map_err(|e| HostmergeError::fs(dir, e))?;
    fs.write_atomic(path, Config::generate_default_yaml().as_bytes())
        .map_err(|e| HostmergeError::fs(path, e))
        .with_context(|| format!("Failed to write config file {:?}", path))?;
    Ok(())
}
