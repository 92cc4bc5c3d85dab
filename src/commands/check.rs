//! Check command implementation.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::lists::{load_domain_list, DomainList};
use crate::validation::is_valid_domain;

/// Where a domain stands across the override files and the current output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainReport {
    pub valid: bool,
    pub allow_listed: bool,
    pub deny_listed: bool,
    /// `None` when no output has been written yet
    pub in_output: Option<bool>,
}

impl DomainReport {
    /// Whether the next update would leave the domain in the output
    pub fn will_be_blocked(&self) -> bool {
        (self.deny_listed && self.valid) || (!self.allow_listed && self.in_output == Some(true))
    }
}

/// Inspect `domain` without creating any file.
pub fn inspect<F: FileSystem + ?Sized>(config: &Config, fs: &F, domain: &str) -> Result<DomainReport> {
    let domain = domain.trim().to_ascii_lowercase();
    let allow = load_domain_list(fs, &config.allow_list_file, false)?;
    let deny = load_domain_list(fs, &config.deny_list_file, false)?;

    let output_path = config.output_path();
    let in_output = if fs.exists(&output_path) {
        let content = fs.read_to_string(&output_path)?;
        Some(DomainList::parse(&content).contains(&domain))
    } else {
        None
    };

    Ok(DomainReport {
        valid: is_valid_domain(&domain),
        allow_listed: allow.contains(&domain),
        deny_listed: deny.contains(&domain),
        in_output,
    })
}

/// Run the check command
pub fn run(domain: &str, config_path: &Path) -> Result<()> {
    let config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        Config::default()
    };

    let report = inspect(&config, real_fs(), domain)?;
    let yes_no = |b: bool| if b { "yes" } else { "no" };

    println!();
    println!("Domain: {}", domain);
    println!("  Valid syntax:  {}", yes_no(report.valid));
    println!("  Allow-listed:  {}", yes_no(report.allow_listed));
    println!("  Deny-listed:   {}", yes_no(report.deny_listed));
    match report.in_output {
        Some(present) => println!("  In output:     {}", yes_no(present)),
        None => println!("  In output:     (no output written yet)"),
    }
    println!();
    if report.will_be_blocked() {
        println!("{} is BLOCKED", domain);
    } else {
        println!("{} is NOT blocked", domain);
    }
    println!();

    Ok(())
}
