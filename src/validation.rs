//! Centralized validation functions for hostmerge.
//!
//! This module provides unified validation for:
//! - Domain names (deny-list entries, CLI arguments)
//! - Source URLs
//! - Alert endpoint URLs

use regex::Regex;
use std::sync::LazyLock;

use crate::error::HostmergeError;

/// Maximum length of a full domain name (RFC 1035, without the trailing dot)
pub const MAX_DOMAIN_LEN: usize = 253;

/// Dot-separated labels of 1-63 alphanumeric/hyphen characters that neither start
/// nor end with a hyphen, closed by an alphabetic TLD of 2+ characters or an IDNA
/// `xn--` label.
static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+(?:[A-Za-z]{2,63}|xn--[A-Za-z0-9](?:[A-Za-z0-9-]{0,57}[A-Za-z0-9])?)$",
    )
    .expect("domain pattern is a valid regex")
});

/// Check whether a string is a syntactically valid domain name.
///
/// # Examples
/// ```
/// use hostmerge::validation::is_valid_domain;
/// assert!(is_valid_domain("good.example.org"));
/// assert!(is_valid_domain("xn--80ak6aa92e.xn--p1ai"));
/// assert!(!is_valid_domain("bad-domain..com"));
/// assert!(!is_valid_domain("localhost"));
/// ```
pub fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty() && domain.len() <= MAX_DOMAIN_LEN && DOMAIN_RE.is_match(domain)
}

/// Validate a domain name, returning a typed error describing the rejection.
///
/// # Examples
/// ```
/// use hostmerge::validation::validate_domain;
/// assert!(validate_domain("ads.example.com").is_ok());
/// assert!(validate_domain("-ads.example.com").is_err());
/// ```
pub fn validate_domain(domain: &str) -> Result<&str, HostmergeError> {
    if domain.is_empty() {
        return Err(HostmergeError::InvalidDomain("empty domain".to_string()));
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(HostmergeError::InvalidDomain(format!(
            "{} exceeds {} characters",
            crate::utils::truncate(domain, 32),
            MAX_DOMAIN_LEN
        )));
    }
    if !DOMAIN_RE.is_match(domain) {
        return Err(HostmergeError::InvalidDomain(domain.to_string()));
    }
    Ok(domain)
}

/// Validate a blocklist source URL (http or https, with a host part).
pub fn validate_source_url(url: &str) -> Result<(), HostmergeError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| {
            HostmergeError::Config(format!("Source URL must use http or https: {}", url))
        })?;

    if rest.is_empty() || rest.starts_with('/') || rest.chars().any(char::is_whitespace) {
        return Err(HostmergeError::Config(format!(
            "Source URL has no valid host: {}",
            url
        )));
    }
    Ok(())
}

/// Alert endpoints carry credentials, so only HTTPS is accepted.
pub fn validate_alert_url(name: &str, url: &str) -> Result<(), HostmergeError> {
    if !url.starts_with("https://") {
        return Err(HostmergeError::Config(format!(
            "{} URL must use HTTPS: {}",
            name, url
        )));
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Domains assembled from well-formed labels always validate
        #[test]
        fn prop_well_formed_domains_accepted(
            labels in prop::collection::vec("[a-z0-9]([a-z0-9-]{0,10}[a-z0-9])?", 1..4),
            tld in "[a-z]{2,6}",
        ) {
            let domain = format!("{}.{}", labels.join("."), tld);
            prop_assert!(is_valid_domain(&domain));
        }

        /// Validation never panics on arbitrary input
        #[test]
        fn prop_arbitrary_input_no_panic(s in ".{0,300}") {
            let _ = is_valid_domain(&s);
        }

        /// Anything containing whitespace is rejected
        #[test]
        fn prop_whitespace_rejected(a in "[a-z]{1,8}", b in "[a-z]{2,6}") {
            let domain = format!("{} {}.{}", a, a, b);
            prop_assert!(!is_valid_domain(&domain));
        }
    }
}
