//! Search query strategies.
//!
//! A fixed, ordered list of query templates. Each one is rendered against a
//! platform's primary domain, so the same list serves every platform. The
//! discovery loop consumes a prefix of it bounded by the query budget.

use serde::Serialize;

/// Broad grouping of a strategy, used for logging and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyCategory {
    /// Bare domain scan and careers/jobs/hiring qualifiers
    Basic,
    /// Role or work-arrangement qualifiers
    Role,
    /// Top tech-hiring cities
    Location,
    /// Company stage or accelerator
    CompanyType,
}

/// One query template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryStrategy {
    pub category: StrategyCategory,
    /// Appended after the `site:` restriction; `None` for a bare scan
    pub qualifier: Option<&'static str>,
}

impl QueryStrategy {
    const fn new(category: StrategyCategory, qualifier: Option<&'static str>) -> Self {
        Self {
            category,
            qualifier,
        }
    }

    /// Render the query string for `domain`.
    pub fn render(&self, domain: &str) -> String {
        match self.qualifier {
            Some(q) => format!("site:{} {}", domain, q),
            None => format!("site:{}", domain),
        }
    }
}

use StrategyCategory::*;

const STRATEGIES: &[QueryStrategy] = &[
    QueryStrategy::new(Basic, None),
    QueryStrategy::new(Basic, Some("careers")),
    QueryStrategy::new(Basic, Some("jobs")),
    QueryStrategy::new(Basic, Some("hiring")),
    QueryStrategy::new(Role, Some("software engineer")),
    QueryStrategy::new(Role, Some("product manager")),
    QueryStrategy::new(Role, Some("designer")),
    QueryStrategy::new(Role, Some("remote")),
    QueryStrategy::new(Location, Some("San Francisco")),
    QueryStrategy::new(Location, Some("New York")),
    QueryStrategy::new(Location, Some("London")),
    QueryStrategy::new(Location, Some("Berlin")),
    QueryStrategy::new(Location, Some("Singapore")),
    QueryStrategy::new(CompanyType, Some("startup")),
    QueryStrategy::new(CompanyType, Some("YC")),
];

/// The full strategy sequence, in the order queries are issued.
pub fn strategies() -> &'static [QueryStrategy] {
    STRATEGIES
}

/// Queries for `domain`, at most `max_queries` of them.
pub fn queries_for(
    domain: &str,
    max_queries: usize,
) -> impl Iterator<Item = (QueryStrategy, String)> + '_ {
    strategies()
        .iter()
        .take(max_queries)
        .map(move |s| (*s, s.render(domain)))
}
