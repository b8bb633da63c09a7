//! SerpAPI search provider (Google Light engine).
//!
//! Classic paged search: each page is a separate billed request returning
//! up to ten organic results.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use super::SearchProvider;
use crate::budget::Pricing;
use crate::credentials::ApiKey;
use crate::error::{SearchError, SearchResult};

pub const DEFAULT_SERPAPI_API_URL: &str = "https://serpapi.com";

const RESULTS_PER_PAGE: usize = 10;

/// Developer plan: $50/month for 5,000 searches.
const USD_PER_SEARCH: f64 = 50.0 / 5_000.0;

/// Returned in the `error` field when a query simply has no hits.
const NO_RESULTS_MARKER: &str = "hasn't returned any results";

/// SerpAPI-backed search.
pub struct SerpApiProvider {
    client: Client,
    api_key: ApiKey,
    base_url: String,
    pages_per_query: u32,
}

#[derive(Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct OrganicResult {
    link: Option<String>,
}

impl SerpApiProvider {
    pub fn new(api_key: ApiKey) -> SearchResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_SERPAPI_API_URL.to_string(),
            pages_per_query: 1,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Walk up to `pages` result pages per query (at least one).
    pub fn with_pages_per_query(mut self, pages: u32) -> Self {
        self.pages_per_query = pages.max(1);
        self
    }

    async fn fetch_page(&self, query: &str, start: usize) -> SearchResult<Vec<String>> {
        let url = format!("{}/search.json", self.base_url);
        let start = start.to_string();
        let num = RESULTS_PER_PAGE.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("engine", "google_light"),
                ("q", query),
                ("start", start.as_str()),
                ("num", num.as_str()),
                ("api_key", self.api_key.expose()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                provider: "serpapi",
                status,
                body,
            });
        }

        let parsed: SerpResponse = response.json().await.map_err(|e| SearchError::Decode {
            provider: "serpapi",
            reason: e.to_string(),
        })?;

        if let Some(error) = parsed.error {
            if error.contains(NO_RESULTS_MARKER) {
                return Ok(Vec::new());
            }
            return Err(SearchError::Rejected {
                provider: "serpapi",
                reason: error,
            });
        }

        Ok(parsed
            .organic_results
            .into_iter()
            .filter_map(|r| r.link)
            .filter(|l| !l.is_empty())
            .collect())
    }
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    async fn search(&self, query: &str, limit: usize) -> SearchResult<Vec<String>> {
        let mut urls = Vec::new();

        for page in 0..self.pages_per_query as usize {
            if urls.len() >= limit {
                break;
            }

            let links = match self.fetch_page(query, page * RESULTS_PER_PAGE).await {
                Ok(links) => links,
                // Earlier pages were already billed; keep what they returned
                Err(e) if !urls.is_empty() => {
                    warn!(
                        query = %query,
                        page,
                        kept = urls.len(),
                        error = %e,
                        "SerpAPI page failed, keeping earlier pages"
                    );
                    break;
                }
                Err(e) => return Err(e),
            };
            let exhausted = links.len() < RESULTS_PER_PAGE;
            urls.extend(links);

            if exhausted {
                break;
            }
        }

        urls.truncate(limit);
        Ok(urls)
    }

    fn name(&self) -> &'static str {
        "serpapi"
    }

    /// Billed per page; a query is priced at its full page allowance.
    fn pricing(&self) -> Pricing {
        Pricing::new(self.pages_per_query, USD_PER_SEARCH)
    }
}
