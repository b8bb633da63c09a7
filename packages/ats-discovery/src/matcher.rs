//! Canonical company URL extraction.
//!
//! A raw search result URL is reduced to the root of a company's job board
//! (`https://jobs.lever.co/acme/job/123?ref=x` -> `https://jobs.lever.co/acme`).
//! The canonical form is the dedup key for everything downstream.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DiscoveryError, Result};

/// Normalized company-root job board URL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CanonicalUrl {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A canonicalization pattern anchored at the start of the input.
///
/// The source pattern must contain exactly one capturing group; group 1 is
/// the canonical URL.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    source: String,
    regex: Regex,
}

impl UrlPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})", pattern))
            .map_err(|e| DiscoveryError::Config(format!("invalid URL pattern {pattern}: {e}")))?;

        // Group 0 is the whole match
        if regex.captures_len() != 2 {
            return Err(DiscoveryError::Config(format!(
                "URL pattern {pattern} must have exactly one capturing group"
            )));
        }

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written, without the start anchor.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn capture<'a>(&self, raw: &'a str) -> Option<&'a str> {
        self.regex
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Extract the canonical company URL from a raw result URL.
///
/// Returns `None` when the URL is not on one of `domains`, or when no
/// pattern matches (a deep link or unrelated page on the same host).
/// Patterns are tried in order and the first match wins.
pub fn extract<S: AsRef<str>>(
    raw_url: &str,
    patterns: &[UrlPattern],
    domains: &[S],
) -> Option<CanonicalUrl> {
    if raw_url.is_empty() {
        return None;
    }

    // Cheap substring check before any regex work
    if !domains.iter().any(|d| raw_url.contains(d.as_ref())) {
        return None;
    }

    patterns
        .iter()
        .find_map(|p| p.capture(raw_url))
        .map(CanonicalUrl::new)
}
