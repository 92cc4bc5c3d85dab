//! Allow-list and deny-list command implementation.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::cli::ListAction;
use crate::config::Config;
use crate::fs_abstraction::real_fs;
use crate::lists::{add_domain, load_domain_list, remove_domain};
use crate::validation::validate_domain;

/// Which override file a command edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Allow,
    Deny,
}

impl ListKind {
    pub fn label(&self) -> &'static str {
        match self {
            ListKind::Allow => "allow-list",
            ListKind::Deny => "deny-list",
        }
    }

    pub fn path(&self, config: &Config) -> PathBuf {
        match self {
            ListKind::Allow => config.allow_list_file.clone(),
            ListKind::Deny => config.deny_list_file.clone(),
        }
    }
}

/// Run an allowlist/denylist command
pub fn run(kind: ListKind, action: ListAction, config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let path = kind.path(&config);

    match action {
        ListAction::Add { domain } => {
            let domain = domain.trim().to_ascii_lowercase();
            validate_domain(&domain)?;
            if add_domain(real_fs(), &path, &domain)? {
                println!("[OK] Added {} to {}", domain, kind.label());
                println!("     Run 'hostmerge update' to apply changes");
            } else {
                println!("{} is already in the {}", domain, kind.label());
            }
        }
        ListAction::Del { domain } => {
            let domain = domain.trim().to_ascii_lowercase();
            if remove_domain(real_fs(), &path, &domain)? {
                println!("[OK] Removed {} from {}", domain, kind.label());
                println!("     Run 'hostmerge update' to apply changes");
            } else {
                println!("{} was not in the {}", domain, kind.label());
            }
        }
        ListAction::List => {
            let list = load_domain_list(real_fs(), &path, false)?;
            println!("{} ({} domains, {}):", kind.label(), list.len(), path.display());
            if list.is_empty() {
                println!("  (empty)");
            }
            for domain in list.iter() {
                println!("  {}", domain);
            }
        }
    }

    Ok(())
}
