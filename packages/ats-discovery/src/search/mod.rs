//! Search provider abstraction.
//!
//! Discovery only needs one thing from a search API: the result URLs for a
//! query. Each provider shape (Firecrawl's combined search, SerpAPI's paged
//! organic results) flattens its response to that, so the discovery loop is
//! written once.
//!
//! # Implementations
//!
//! - `FirecrawlProvider` - Firecrawl search endpoint (`data.web[].url`)
//! - `SerpApiProvider` - SerpAPI Google Light engine (`organic_results[].link`)
//! - `MockSearchProvider` - For testing

mod firecrawl;
mod mock;
mod serpapi;

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::budget::Pricing;
use crate::credentials::ApiKey;
use crate::error::{DiscoveryError, Result, SearchResult};

pub use firecrawl::{FirecrawlProvider, DEFAULT_FIRECRAWL_API_URL};
pub use mock::MockSearchProvider;
pub use serpapi::{SerpApiProvider, DEFAULT_SERPAPI_API_URL};

/// A web search API that can be restricted with `site:` queries.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query` and return up to `limit` result URLs, in provider order.
    ///
    /// Results without a URL are skipped. An empty vector is a valid
    /// answer; errors are reserved for failed calls.
    async fn search(&self, query: &str, limit: usize) -> SearchResult<Vec<String>>;

    /// Short provider name for logs and reports.
    fn name(&self) -> &'static str;

    /// Billing used for credit and cost accounting.
    fn pricing(&self) -> Pricing;
}

/// Builds the provider for a platform run.
///
/// Construction is deferred to each run so that a missing credential fails
/// that run with a diagnostic instead of the whole process.
pub trait ProviderFactory: Send + Sync {
    fn build(&self) -> Result<Arc<dyn SearchProvider>>;
}

impl<F> ProviderFactory for F
where
    F: Fn() -> Result<Arc<dyn SearchProvider>> + Send + Sync,
{
    fn build(&self) -> Result<Arc<dyn SearchProvider>> {
        self()
    }
}

/// Supported provider shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Firecrawl,
    SerpApi,
}

impl ProviderKind {
    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::Firecrawl => "FIRECRAWL_API_KEY",
            ProviderKind::SerpApi => "SERPAPI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Firecrawl => f.write_str("firecrawl"),
            ProviderKind::SerpApi => f.write_str("serpapi"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firecrawl" => Ok(ProviderKind::Firecrawl),
            "serpapi" | "serp" => Ok(ProviderKind::SerpApi),
            other => Err(format!(
                "unknown provider: {other} (expected firecrawl or serpapi)"
            )),
        }
    }
}

/// Everything needed to construct a real provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    /// Result pages fetched per query (SerpAPI only)
    pub pages_per_query: u32,
}

impl ProviderFactory for ProviderSettings {
    fn build(&self) -> Result<Arc<dyn SearchProvider>> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(DiscoveryError::MissingCredential {
                var: self.kind.api_key_var(),
            })?;

        let provider: Arc<dyn SearchProvider> = match self.kind {
            ProviderKind::Firecrawl => {
                Arc::new(FirecrawlProvider::new(api_key)?.with_base_url(&self.base_url))
            }
            ProviderKind::SerpApi => Arc::new(
                SerpApiProvider::new(api_key)?
                    .with_base_url(&self.base_url)
                    .with_pages_per_query(self.pages_per_query),
            ),
        };

        Ok(provider)
    }
}
