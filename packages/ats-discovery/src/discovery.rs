//! The per-platform discovery loop.
//!
//! Issues strategy queries against one platform until the query budget or
//! the strategy list runs out, canonicalizes every result URL, and then
//! merges the session into the platform's store.
//!
//! A failed query counts as zero results: one bad query must not cost the
//! rest of the budget. Cancellation is checked between queries and during
//! pacing; a cancelled run returns before the store is touched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::budget::{BudgetSnapshot, QueryBudget};
use crate::config::DiscoveryOptions;
use crate::error::{DiscoveryError, Result};
use crate::matcher::CanonicalUrl;
use crate::merge::{self, DiscoveredSet};
use crate::platforms::PlatformConfig;
use crate::search::SearchProvider;
use crate::store;
use crate::strategy;

/// How many new URLs a report lists by name.
const NEW_URL_SAMPLE_SIZE: usize = 10;

/// Why the loop stopped issuing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every strategy was used
    StrategiesExhausted,
    /// `max_queries` was reached first
    QueryLimit,
    /// The next query would have exceeded `max_credits`
    CreditCeiling,
}

/// URLs and counters gathered by one run of the loop, before merging.
#[derive(Debug, Clone)]
pub struct Session {
    pub urls: DiscoveredSet,
    pub budget: BudgetSnapshot,
    pub stop_reason: StopReason,
}

/// Drives the queries for one platform.
pub struct DiscoveryLoop<'a> {
    platform: &'a PlatformConfig,
    provider: &'a dyn SearchProvider,
    options: &'a DiscoveryOptions,
}

impl<'a> DiscoveryLoop<'a> {
    pub fn new(
        platform: &'a PlatformConfig,
        provider: &'a dyn SearchProvider,
        options: &'a DiscoveryOptions,
    ) -> Self {
        Self {
            platform,
            provider,
            options,
        }
    }

    /// Run queries until a stop condition, returning the session's URLs.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<Session> {
        let mut budget = QueryBudget::new(self.options.max_queries, self.provider.pricing())
            .with_credit_ceiling(self.options.max_credits);
        let mut session = DiscoveredSet::new();
        let mut stop_reason = StopReason::StrategiesExhausted;
        let domain = self.platform.primary_domain().ok_or_else(|| {
            DiscoveryError::Config(format!("platform {} has no domains", self.platform.name))
        })?;
        let planned = self.options.max_queries.min(strategy::strategies().len());

        for (strategy_idx, strategy) in strategy::strategies().iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(DiscoveryError::Cancelled);
            }
            if budget.queries_exhausted() {
                info!(
                    platform = %self.platform.name,
                    max_queries = self.options.max_queries,
                    "Reached query limit"
                );
                stop_reason = StopReason::QueryLimit;
                break;
            }
            if !budget.can_afford_query() {
                warn!(
                    platform = %self.platform.name,
                    max_credits = ?self.options.max_credits,
                    credits_used = budget.snapshot().credits_used,
                    "Credit ceiling reached, stopping early"
                );
                stop_reason = StopReason::CreditCeiling;
                break;
            }

            if strategy_idx > 0 {
                pause(self.options.query_delay, cancel).await?;
            }

            let query = strategy.render(domain);
            info!(
                platform = %self.platform.name,
                query = %query,
                category = ?strategy.category,
                "[Query {}/{}]",
                strategy_idx + 1,
                planned
            );

            let search = self.provider.search(&query, self.options.limit_per_query);
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
                outcome = search => outcome,
            };

            let raw_urls = match outcome {
                Ok(urls) => {
                    budget.record_success();
                    urls
                }
                Err(e) => {
                    budget.record_failure();
                    warn!(
                        platform = %self.platform.name,
                        query = %query,
                        error = %e,
                        "Search failed, counting as zero results"
                    );
                    continue;
                }
            };

            if raw_urls.is_empty() {
                info!(query = %query, "No results found");
                continue;
            }

            let query_urls: DiscoveredSet = raw_urls
                .iter()
                .filter_map(|raw| {
                    let canonical = self.platform.canonicalize(raw);
                    if canonical.is_none() {
                        debug!(url = %raw, "Not a company board URL");
                    }
                    canonical
                })
                .collect();

            let found = query_urls.len();
            let new_in_query = session.absorb(query_urls);
            let snapshot = budget.snapshot();

            info!(
                platform = %self.platform.name,
                results = raw_urls.len(),
                found,
                new_in_query,
                credits = self.provider.pricing().credits_per_query,
                total_credits = snapshot.credits_used,
                "Query results"
            );
        }

        Ok(Session {
            urls: session,
            budget: budget.snapshot(),
            stop_reason,
        })
    }
}

/// Summary of one platform run.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub platform: String,
    pub provider: &'static str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub budget: BudgetSnapshot,
    pub stop_reason: StopReason,
    /// Distinct companies seen this session
    pub companies_found: usize,
    /// Companies not already in the store
    pub new_companies: usize,
    /// Companies in the store after the merge
    pub total_companies: usize,
    /// First few new companies, sorted
    pub new_sample: Vec<CanonicalUrl>,
    pub output_file: PathBuf,
}

/// Discover one platform end to end: load, query, merge, persist.
///
/// An unreadable store is logged and treated as empty. A failed write is
/// returned as an error so the session's URLs are never silently lost.
pub async fn discover_platform(
    platform: &PlatformConfig,
    provider: &dyn SearchProvider,
    options: &DiscoveryOptions,
    output_dir: &Path,
    cancel: &CancellationToken,
) -> Result<DiscoveryReport> {
    let started_at = Utc::now();
    let output_file = platform.store_path(output_dir);

    info!(
        platform = %platform.name,
        provider = provider.name(),
        max_queries = options.max_queries,
        limit_per_query = options.limit_per_query,
        "Starting discovery"
    );

    let existing = store::load_or_empty(&output_file, &platform.csv_column);

    let session = DiscoveryLoop::new(platform, provider, options)
        .run(cancel)
        .await?;

    let merged = merge::merge(&existing, &session.urls);

    info!(
        platform = %platform.name,
        queries = session.budget.queries_issued,
        failed = session.budget.failed_queries,
        credits = session.budget.credits_used,
        cost_usd = %format!("{:.3}", session.budget.cost_usd),
        found = session.urls.len(),
        new = merged.new_only.len(),
        "Discovery summary"
    );

    let new_sample: Vec<CanonicalUrl> = merged
        .new_only
        .iter()
        .take(NEW_URL_SAMPLE_SIZE)
        .cloned()
        .collect();
    for url in &new_sample {
        info!(platform = %platform.name, url = %url, "New company");
    }

    store::persist(&merged.combined, &output_file, &platform.csv_column)?;

    info!(
        platform = %platform.name,
        total = merged.combined.len(),
        path = %output_file.display(),
        "Saved companies"
    );

    Ok(DiscoveryReport {
        platform: platform.name.clone(),
        provider: provider.name(),
        started_at,
        finished_at: Utc::now(),
        budget: session.budget,
        stop_reason: session.stop_reason,
        companies_found: session.urls.len(),
        new_companies: merged.new_only.len(),
        total_companies: merged.combined.len(),
        new_sample,
        output_file,
    })
}

/// Cancellable sleep used for pacing.
pub(crate) async fn pause(delay: Duration, cancel: &CancellationToken) -> Result<()> {
    if delay.is_zero() {
        return Ok(());
    }

    tokio::select! {
        _ = cancel.cancelled() => Err(DiscoveryError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
