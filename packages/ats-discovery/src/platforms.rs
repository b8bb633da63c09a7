//! Platform registry.
//!
//! Binds each supported ATS to its search domains, canonicalization
//! patterns, store location, and store column. Built once at startup and
//! passed to the orchestrator; never mutated afterwards.

use std::path::{Path, PathBuf};

use crate::error::{DiscoveryError, Result};
use crate::matcher::{self, CanonicalUrl, UrlPattern};

/// Static description of one ATS platform.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Registry key, e.g. "lever"
    pub name: String,

    /// Hosts the platform serves job boards from. The first one is used to
    /// render search queries.
    pub domains: Vec<String>,

    /// Ordered canonicalization patterns, first match wins.
    pub patterns: Vec<UrlPattern>,

    /// Store path, relative to the output directory.
    pub output_file: PathBuf,

    /// Column holding the URLs in the store.
    pub csv_column: String,
}

impl PlatformConfig {
    pub fn new(
        name: impl Into<String>,
        domains: &[&str],
        patterns: &[&str],
        output_file: impl Into<PathBuf>,
        csv_column: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        if domains.is_empty() {
            return Err(DiscoveryError::Config(format!(
                "platform {name} has no domains"
            )));
        }
        if patterns.is_empty() {
            return Err(DiscoveryError::Config(format!(
                "platform {name} has no URL patterns"
            )));
        }

        Ok(Self {
            name,
            domains: domains.iter().map(|d| d.to_string()).collect(),
            patterns: patterns
                .iter()
                .map(|p| UrlPattern::new(p))
                .collect::<Result<Vec<_>>>()?,
            output_file: output_file.into(),
            csv_column: csv_column.into(),
        })
    }

    /// Domain substituted into search queries, `None` if `domains` is empty.
    pub fn primary_domain(&self) -> Option<&str> {
        self.domains.first().map(String::as_str)
    }

    /// Canonical company URL for a raw result URL on this platform.
    pub fn canonicalize(&self, raw_url: &str) -> Option<CanonicalUrl> {
        matcher::extract(raw_url, &self.patterns, &self.domains)
    }

    /// Full store path under `output_dir`.
    pub fn store_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.output_file)
    }
}

/// Ordered, immutable set of platforms.
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    platforms: Vec<PlatformConfig>,
}

impl PlatformRegistry {
    pub fn new(platforms: Vec<PlatformConfig>) -> Self {
        Self { platforms }
    }

    /// The ATS platforms supported out of the box.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(vec![
            PlatformConfig::new(
                "ashby",
                &["jobs.ashbyhq.com"],
                &[r"(https://jobs\.ashbyhq\.com/[^/?#]+)"],
                "ashby/companies.csv",
                "ashby_url",
            )?,
            PlatformConfig::new(
                "greenhouse",
                &["job-boards.greenhouse.io", "boards.greenhouse.io"],
                &[r"(https://(?:job-boards|boards)\.greenhouse\.io/[^/?#]+)"],
                "greenhouse/greenhouse_companies.csv",
                "greenhouse_url",
            )?,
            PlatformConfig::new(
                "lever",
                &["jobs.lever.co"],
                &[r"(https://jobs\.lever\.co/[^/?#]+)"],
                "lever/lever_companies.csv",
                "lever_url",
            )?,
            PlatformConfig::new(
                "workable",
                &["apply.workable.com", "jobs.workable.com"],
                &[
                    r"(https://apply\.workable\.com/[^/?#]+)",
                    r"(https://jobs\.workable\.com/company/[^/?#]+/[^/?#]+)",
                ],
                "workable/workable_companies.csv",
                "workable_url",
            )?,
        ]))
    }

    /// Look up a platform by name, case-insensitively.
    pub fn get(&self, name: &str) -> Result<&PlatformConfig> {
        self.platforms
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| DiscoveryError::UnknownPlatform {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.platforms.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatformConfig> {
        self.platforms.iter()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_order() {
        let registry = PlatformRegistry::builtin().unwrap();
        assert_eq!(
            registry.names(),
            vec!["ashby", "greenhouse", "lever", "workable"]
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = PlatformRegistry::builtin().unwrap();
        let lever = registry.get("Lever").unwrap();
        assert_eq!(lever.csv_column, "lever_url");
        assert_eq!(lever.primary_domain(), Some("jobs.lever.co"));
    }

    #[test]
    fn test_unknown_platform_lists_available() {
        let registry = PlatformRegistry::builtin().unwrap();
        let err = registry.get("taleo").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("taleo"));
        assert!(message.contains("ashby, greenhouse, lever, workable"));
    }

    #[test]
    fn test_greenhouse_accepts_both_hosts() {
        let registry = PlatformRegistry::builtin().unwrap();
        let greenhouse = registry.get("greenhouse").unwrap();

        assert_eq!(
            greenhouse
                .canonicalize("https://boards.greenhouse.io/acme/jobs/42")
                .unwrap()
                .as_str(),
            "https://boards.greenhouse.io/acme"
        );
        assert_eq!(
            greenhouse
                .canonicalize("https://job-boards.greenhouse.io/beta?gh_src=x")
                .unwrap()
                .as_str(),
            "https://job-boards.greenhouse.io/beta"
        );
    }

    #[test]
    fn test_patterns_only_match_own_domains() {
        let registry = PlatformRegistry::builtin().unwrap();
        let ashby = registry.get("ashby").unwrap();
        assert!(ashby.canonicalize("https://jobs.lever.co/acme").is_none());
    }

    #[test]
    fn test_store_path_is_relative_to_output_dir() {
        let registry = PlatformRegistry::builtin().unwrap();
        let ashby = registry.get("ashby").unwrap();
        assert_eq!(
            ashby.store_path(Path::new("/data")),
            PathBuf::from("/data/ashby/companies.csv")
        );
    }

    #[test]
    fn test_primary_domain_of_hand_built_config_without_domains() {
        let mut lever = PlatformRegistry::builtin().unwrap().get("lever").unwrap().clone();
        lever.domains.clear();
        assert_eq!(lever.primary_domain(), None);
    }

    #[test]
    fn test_platform_requires_domains_and_patterns() {
        assert!(PlatformConfig::new("x", &[], &["(a)"], "x.csv", "url").is_err());
        assert!(PlatformConfig::new("x", &["x.com"], &[], "x.csv", "url").is_err());
    }
}
