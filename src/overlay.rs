//! Allow/deny-list overlay.
//!
//! The allow-phase runs strictly before the deny-phase. A domain listed in both
//! files is therefore removed and then re-added: the deny-list wins.

use std::borrow::Cow;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::aggregator::Entry;
use crate::lists::{fold_case, DomainList};
use crate::validation::is_valid_domain;

/// What the overlay changed, for logs and notifications
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OverlayReport {
    /// Domains dropped because they are allow-listed (unique, first-seen order)
    pub allow_removed: Vec<String>,
    /// Deny-listed domains appended to the result
    pub deny_added: Vec<String>,
    /// Deny-listed entries skipped for failing domain validation
    pub deny_invalid: Vec<String>,
    /// Domains present in both lists
    pub conflicts: Vec<String>,
}

/// Drop every entry whose domain is allow-listed.
///
/// Entries without a domain token (lenient mode only) are kept.
pub fn apply_allowlist(entries: Vec<Entry>, allow: &DomainList) -> (Vec<Entry>, Vec<String>) {
    if allow.is_empty() {
        return (entries, Vec::new());
    }

    let mut removed = Vec::new();
    let mut removed_seen = HashSet::new();
    let kept = entries
        .into_iter()
        .filter(|entry| match entry.domain() {
            Some(domain) if allow.contains(domain) => {
                if removed_seen.insert(domain.to_string()) {
                    removed.push(domain.to_string());
                }
                false
            }
            _ => true,
        })
        .collect();

    (kept, removed)
}

/// Append an entry for every valid deny-listed domain not already present.
///
/// Returns the domains added and the ones rejected by validation.
pub fn apply_denylist(entries: &mut Vec<Entry>, deny: &DomainList) -> (Vec<String>, Vec<String>) {
    let mut added = Vec::new();
    let mut invalid = Vec::new();

    let additions: Vec<Entry> = {
        let present: HashSet<Cow<'_, str>> = entries
            .iter()
            .filter_map(Entry::domain)
            .map(fold_case)
            .collect();
        deny.iter()
            .filter(|domain| !present.contains(*domain))
            .filter_map(|domain| {
                if is_valid_domain(domain) {
                    added.push(domain.to_string());
                    Some(Entry::from_domain(domain))
                } else {
                    invalid.push(domain.to_string());
                    None
                }
            })
            .collect()
    };

    entries.extend(additions);
    (added, invalid)
}

/// Run the allow-phase, then the deny-phase.
pub fn apply(entries: Vec<Entry>, allow: &DomainList, deny: &DomainList) -> (Vec<Entry>, OverlayReport) {
    let conflicts: Vec<String> = deny
        .iter()
        .filter(|domain| allow.contains(domain))
        .map(str::to_string)
        .collect();
    for domain in &conflicts {
        info!("{} is in both allow-list and deny-list; deny-list wins", domain);
    }

    let (mut entries, allow_removed) = apply_allowlist(entries, allow);
    info!("Allow-list removed {} domains", allow_removed.len());
    for domain in &allow_removed {
        debug!("Removed allow-listed domain: {}", domain);
    }

    let (deny_added, deny_invalid) = apply_denylist(&mut entries, deny);
    for domain in &deny_added {
        info!("Added missing deny-listed domain: {}", domain);
    }
    for domain in &deny_invalid {
        warn!("Skipping invalid deny-list domain: {}", domain);
    }

    (
        entries,
        OverlayReport {
            allow_removed,
            deny_added,
            deny_invalid,
            conflicts,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(domains: &[&str]) -> Vec<Entry> {
        domains.iter().map(|d| Entry::from_domain(d)).collect()
    }

    fn domains(entries: &[Entry]) -> Vec<&str> {
        entries.iter().filter_map(Entry::domain).collect()
    }

    #[test]
    fn test_allowlist_removes_matching_domains() {
        let allow = DomainList::parse("track.example.com\nunused.example.com");
        let (kept, removed) =
            apply_allowlist(entries(&["ads.example.com", "track.example.com"]), &allow);
        assert_eq!(domains(&kept), vec!["ads.example.com"]);
        assert_eq!(removed, vec!["track.example.com"]);
    }

    #[test]
    fn test_allowlist_is_exact_match_only() {
        let allow = DomainList::parse("example.com");
        let (kept, removed) = apply_allowlist(entries(&["ads.example.com", "example.com"]), &allow);
        assert_eq!(domains(&kept), vec!["ads.example.com"]);
        assert_eq!(removed, vec!["example.com"]);
    }

    #[test]
    fn test_allowlist_reports_each_domain_once() {
        let allow = DomainList::parse("x.example.com");
        let input = vec![
            Entry::from_domain("x.example.com"),
            crate::aggregator::normalize_line("0.0.0.0\tx.example.com", false).unwrap(),
        ];
        let (kept, removed) = apply_allowlist(input, &allow);
        assert!(kept.is_empty());
        assert_eq!(removed, vec!["x.example.com"]);
    }

    #[test]
    fn test_allowlist_keeps_domainless_entries() {
        let allow = DomainList::parse("x.example.com");
        let input = vec![crate::aggregator::normalize_line("0.0.0.0", false).unwrap()];
        let (kept, removed) = apply_allowlist(input, &allow);
        assert_eq!(kept.len(), 1);
        assert!(removed.is_empty());
    }

    #[test]
    fn test_denylist_adds_only_missing_valid_domains() {
        let deny = DomainList::parse("ads.example.com\nnew.example.org\nbad-domain..com");
        let mut result = entries(&["ads.example.com"]);
        let (added, invalid) = apply_denylist(&mut result, &deny);

        assert_eq!(domains(&result), vec!["ads.example.com", "new.example.org"]);
        assert_eq!(added, vec!["new.example.org"]);
        assert_eq!(invalid, vec!["bad-domain..com"]);
    }

    #[test]
    fn test_denylist_present_invalid_domain_not_reported() {
        // Already present, so never validated
        let deny = DomainList::parse("weird_name.example.com");
        let mut result = entries(&["weird_name.example.com"]);
        let (added, invalid) = apply_denylist(&mut result, &deny);
        assert!(added.is_empty());
        assert!(invalid.is_empty());
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_overlay_matches_domains_case_insensitively() {
        let allow = DomainList::parse("Track.Example.com");
        let deny = DomainList::parse("Ads.Example.com");
        let (result, report) = apply(entries(&["ADS.example.com", "track.example.COM"]), &allow, &deny);

        assert_eq!(domains(&result), vec!["ADS.example.com"]);
        assert_eq!(report.allow_removed, vec!["track.example.COM"]);
        assert!(report.deny_added.is_empty());
    }

    #[test]
    fn test_deny_wins_over_allow() {
        let allow = DomainList::parse("both.example.com");
        let deny = DomainList::parse("both.example.com");
        let (result, report) = apply(entries(&["both.example.com", "other.example.com"]), &allow, &deny);

        assert_eq!(domains(&result), vec!["other.example.com", "both.example.com"]);
        assert_eq!(report.allow_removed, vec!["both.example.com"]);
        assert_eq!(report.deny_added, vec!["both.example.com"]);
        assert_eq!(report.conflicts, vec!["both.example.com"]);
    }

    #[test]
    fn test_apply_with_empty_lists_is_identity() {
        let input = entries(&["a.example.com", "b.example.com"]);
        let (result, report) = apply(input.clone(), &DomainList::new(), &DomainList::new());
        assert_eq!(result, input);
        assert_eq!(report, OverlayReport::default());
    }
}
