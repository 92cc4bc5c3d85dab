//! Hosts-line normalization and deduplication.
//!
//! Raw lines from every source are canonicalized to `0.0.0.0 <domain>`,
//! collapsed to their first occurrence, then handed to the [`overlay`](crate::overlay)
//! for allow/deny-list processing.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use crate::lists::DomainList;
use crate::overlay::{self, OverlayReport};

/// Non-routable address every blocked domain is pointed at
pub const SINK_ADDRESS: &str = "0.0.0.0";

/// One canonical output line, `0.0.0.0 <domain>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry(String);

impl Entry {
    /// Build an entry for a bare domain.
    pub fn from_domain(domain: &str) -> Self {
        Self(format!("{} {}", SINK_ADDRESS, domain))
    }

    /// The full line as written to the output file.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Second whitespace-delimited token, if any.
    pub fn domain(&self) -> Option<&str> {
        self.0.split_whitespace().nth(1)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a single raw line.
///
/// Returns `None` for blank lines, comments and (in strict mode) anything that
/// is not exactly a sink token followed by one domain token.
///
/// # Examples
/// ```
/// use hostmerge::aggregator::normalize_line;
/// let e = normalize_line("ads.example.com", true).unwrap();
/// assert_eq!(e.as_str(), "0.0.0.0 ads.example.com");
/// assert!(normalize_line("# comment", true).is_none());
/// assert!(normalize_line("127.0.0.1 localhost", true).is_none());
/// ```
pub fn normalize_line(line: &str, strict: bool) -> Option<Entry> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let prefixed = if trimmed.starts_with(SINK_ADDRESS) {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("{} {}", SINK_ADDRESS, trimmed))
    };

    if !strict {
        return Some(Entry(prefixed.into_owned()));
    }

    let mut tokens = prefixed.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(SINK_ADDRESS), Some(domain), None) => Some(Entry::from_domain(domain)),
        _ => None,
    }
}

/// Result of normalizing a batch of raw lines
#[derive(Debug, Default)]
pub struct Normalized {
    pub entries: Vec<Entry>,
    /// Non-blank, non-comment lines rejected by the strict shape check
    pub malformed: usize,
    pub raw_lines: usize,
}

/// Normalize raw lines in order. Duplicates are kept.
pub fn normalize<'a, I>(lines: I, strict: bool) -> Normalized
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = Normalized::default();
    for line in lines {
        out.raw_lines += 1;
        match normalize_line(line, strict) {
            Some(entry) => out.entries.push(entry),
            None => {
                let trimmed = line.trim();
                if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    out.malformed += 1;
                }
            }
        }
    }
    out
}

/// Keep the first occurrence of every entry, preserving order.
///
/// Returns the deduplicated entries and the number removed.
pub fn deduplicate(mut entries: Vec<Entry>) -> (Vec<Entry>, usize) {
    let before = entries.len();
    let mut seen = HashSet::with_capacity(before);
    entries.retain(|entry| seen.insert(entry.clone()));
    let removed = before - entries.len();
    (entries, removed)
}

/// Everything produced by one pass over the fetched lines
#[derive(Debug, Default)]
pub struct Aggregation {
    pub entries: Vec<Entry>,
    pub raw_lines: usize,
    pub malformed: usize,
    pub duplicates_removed: usize,
    pub overlay: OverlayReport,
}

/// Run normalize → deduplicate → allow/deny overlay.
pub fn aggregate<'a, I>(lines: I, allow: &DomainList, deny: &DomainList, strict: bool) -> Aggregation
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized = normalize(lines, strict);
    let (unique, duplicates_removed) = deduplicate(normalized.entries);
    let (entries, overlay) = overlay::apply(unique, allow, deny);

    Aggregation {
        entries,
        raw_lines: normalized.raw_lines,
        malformed: normalized.malformed,
        duplicates_removed,
        overlay,
    }
}

/// Join entries one per line, without a trailing newline.
pub fn render(entries: &[Entry]) -> String {
    let mut out = String::with_capacity(entries.iter().map(|e| e.0.len() + 1).sum());
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(entry.as_str());
    }
    out
}
