//! Allow-list and deny-list files.
//!
//! Plain text, one domain per line. Hosts-style lines (`0.0.0.0 example.com`),
//! blank lines, `#` comments and trailing comments are accepted.

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::collections::HashSet;
use std::io;
use std::path::Path;
use tracing::info;

use crate::aggregator::SINK_ADDRESS;
use crate::error::HostmergeError;
use crate::fs_abstraction::{parent_dir, FileSystem};

/// Ordered, duplicate-free set of domains loaded from an override file.
///
/// File order is kept so deny-list additions land in the output deterministically.
/// Domains are stored and matched in ASCII lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainList {
    domains: Vec<String>,
    index: HashSet<String>,
}

impl DomainList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse file content into a list.
    pub fn parse(content: &str) -> Self {
        content.lines().filter_map(parse_domain_line).collect()
    }

    /// Insert a domain, returning `false` if it was already present.
    pub fn insert(&mut self, domain: &str) -> bool {
        let domain = fold_case(domain);
        if self.index.contains(domain.as_ref()) {
            return false;
        }
        self.index.insert(domain.to_string());
        self.domains.push(domain.into_owned());
        true
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.index.contains(fold_case(domain).as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for DomainList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut list = DomainList::new();
        for domain in iter {
            list.insert(domain);
        }
        list
    }
}

/// ASCII-lowercase `domain`, borrowing when it already is.
pub fn fold_case(domain: &str) -> Cow<'_, str> {
    if domain.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(domain.to_ascii_lowercase())
    } else {
        Cow::Borrowed(domain)
    }
}

/// Extract the domain from one override-file line.
///
/// # Examples
/// ```
/// use hostmerge::lists::parse_domain_line;
/// assert_eq!(parse_domain_line("ads.example.com"), Some("ads.example.com"));
/// assert_eq!(parse_domain_line("0.0.0.0 ads.example.com"), Some("ads.example.com"));
/// assert_eq!(parse_domain_line("ads.example.com  # noisy"), Some("ads.example.com"));
/// assert_eq!(parse_domain_line("# comment"), None);
/// ```
pub fn parse_domain_line(line: &str) -> Option<&str> {
    let without_comment = line.split('#').next().unwrap_or("");
    let mut tokens = without_comment.split_whitespace();
    match tokens.next()? {
        SINK_ADDRESS => tokens.next(),
        domain => Some(domain),
    }
}

/// Load an override list, creating an empty file when it does not exist.
pub fn load_domain_list<F: FileSystem + ?Sized>(
    fs: &F,
    path: &Path,
    create_if_missing: bool,
) -> Result<DomainList> {
    if !fs.exists(path) {
        if create_if_missing {
            fs.create_dir_all(parent_dir(path))
                .map_err(|e| HostmergeError::fs(parent_dir(path), e))?;
            fs.write_atomic(path, b"")
                .map_err(|e| HostmergeError::fs(path, e))
                .with_context(|| format!("Failed to create list file {:?}", path))?;
            info!("Created empty list file {:?}", path);
        }
        return Ok(DomainList::new());
    }

    let content = read_list(fs, path)?;
    Ok(DomainList::parse(&content))
}

/// Append a domain to a list file. Returns `false` if it was already listed.
pub fn add_domain<F: FileSystem + ?Sized>(fs: &F, path: &Path, domain: &str) -> Result<bool> {
    let mut content = if fs.exists(path) {
        read_list(fs, path)?
    } else {
        fs.create_dir_all(parent_dir(path))
            .map_err(|e| HostmergeError::fs(parent_dir(path), e))?;
        String::new()
    };

    if DomainList::parse(&content).contains(domain) {
        return Ok(false);
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(domain);
    content.push('\n');

    fs.write_atomic(path, content.as_bytes())
        .map_err(|e| HostmergeError::fs(path, e))?;
    Ok(true)
}

/// Remove every line naming `domain` from a list file, keeping comments and
/// other entries untouched. Returns `false` if the domain was not listed.
pub fn remove_domain<F: FileSystem + ?Sized>(fs: &F, path: &Path, domain: &str) -> Result<bool> {
    if !fs.exists(path) {
        return Ok(false);
    }
    let content = read_list(fs, path)?;

    let mut removed = false;
    let kept: Vec<&str> = content
        .lines()
        .filter(|line| {
            let matches = parse_domain_line(line).is_some_and(|d| d.eq_ignore_ascii_case(domain));
            removed |= matches;
            !matches
        })
        .collect();

    if !removed {
        return Ok(false);
    }

    let mut new_content = kept.join("\n");
    if !new_content.is_empty() {
        new_content.push('\n');
    }
    fs.write_atomic(path, new_content.as_bytes())
        .map_err(|e| HostmergeError::fs(path, e))?;
    Ok(true)
}

fn read_list<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<String> {
    fs.read_to_string(path)
        .map_err(|e: io::Error| HostmergeError::fs(path, e))
        .with_context(|| format!("Failed to read list file {:?}", path))
}
