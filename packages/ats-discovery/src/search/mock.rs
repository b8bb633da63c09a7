//! Mock search provider for testing.
//!
//! Returns canned URLs per query, can be told to fail specific queries, and
//! records every query it receives.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use super::{ProviderFactory, SearchProvider};
use crate::budget::Pricing;
use crate::error::{Result, SearchError, SearchResult};

/// Mock provider for testing.
///
/// # Example
///
/// ```rust
/// use ats_discovery::search::MockSearchProvider;
///
/// let provider = MockSearchProvider::new()
///     .with_urls("site:jobs.lever.co", &["https://jobs.lever.co/acme/123"])
///     .failing_on("site:jobs.lever.co careers");
/// ```
#[derive(Clone)]
pub struct MockSearchProvider {
    results: Arc<RwLock<HashMap<String, Vec<String>>>>,
    failures: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<String>>>,
    pricing: Pricing,
}

impl Default for MockSearchProvider {
    fn default() -> Self {
        Self {
            results: Arc::default(),
            failures: Arc::default(),
            calls: Arc::default(),
            pricing: Pricing::new(2, 16.0 / 10_000.0),
        }
    }
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `urls` for `query`.
    pub fn with_urls(self, query: &str, urls: &[&str]) -> Self {
        self.results
            .write()
            .unwrap()
            .insert(query.to_string(), urls.iter().map(|u| u.to_string()).collect());
        self
    }

    /// Fail every call for `query` with a timeout-like error.
    pub fn failing_on(self, query: &str) -> Self {
        self.failures.write().unwrap().insert(query.to_string());
        self
    }

    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = pricing;
        self
    }

    /// Queries received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, query: &str, limit: usize) -> SearchResult<Vec<String>> {
        self.calls.write().unwrap().push(query.to_string());

        if self.failures.read().unwrap().contains(query) {
            return Err(SearchError::Status {
                provider: "mock",
                status: 504,
                body: "gateway timeout".to_string(),
            });
        }

        let mut urls = self
            .results
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default();
        urls.truncate(limit);
        Ok(urls)
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn pricing(&self) -> Pricing {
        self.pricing
    }
}

/// Every build hands out a handle to the same canned results and call log.
impl ProviderFactory for MockSearchProvider {
    fn build(&self) -> Result<Arc<dyn SearchProvider>> {
        Ok(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_canned_urls() {
        let provider =
            MockSearchProvider::new().with_urls("q", &["https://a.io/1", "https://a.io/2"]);

        assert_eq!(provider.search("q", 1).await.unwrap(), vec!["https://a.io/1"]);
        assert!(provider.search("other", 10).await.unwrap().is_empty());
        assert_eq!(provider.calls(), vec!["q", "other"]);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let provider = MockSearchProvider::new().failing_on("bad");
        assert!(provider.search("bad", 10).await.is_err());
        assert_eq!(provider.call_count(), 1);
    }
}
