//! Firecrawl search provider.
//!
//! Uses the search endpoint only (no scraping), which bills 2 credits per
//! 10 results.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::SearchProvider;
use crate::budget::Pricing;
use crate::credentials::ApiKey;
use crate::error::{SearchError, SearchResult};

pub const DEFAULT_FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev";

/// Hobby plan: $16/month for 10,000 credits.
const PRICING: Pricing = Pricing::new(2, 16.0 / 10_000.0);

/// Firecrawl-backed search.
pub struct FirecrawlProvider {
    client: Client,
    api_key: ApiKey,
    base_url: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    limit: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default = "default_success")]
    success: bool,
    data: Option<SearchData>,
    error: Option<String>,
}

fn default_success() -> bool {
    true
}

/// v2 groups results by source, v1 returned a flat list.
#[derive(Deserialize)]
#[serde(untagged)]
enum SearchData {
    Grouped {
        #[serde(default)]
        web: Vec<WebResult>,
    },
    Flat(Vec<WebResult>),
}

#[derive(Deserialize)]
struct WebResult {
    url: Option<String>,
}

impl FirecrawlProvider {
    pub fn new(api_key: ApiKey) -> SearchResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_FIRECRAWL_API_URL.to_string(),
        })
    }

    /// Point at a different API host (self-hosted Firecrawl, tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn urls_from(response: SearchResponse) -> SearchResult<Vec<String>> {
        if !response.success {
            return Err(SearchError::Rejected {
                provider: "firecrawl",
                reason: response
                    .error
                    .unwrap_or_else(|| "success=false".to_string()),
            });
        }

        let results = match response.data {
            Some(SearchData::Grouped { web }) => web,
            Some(SearchData::Flat(results)) => results,
            None => Vec::new(),
        };

        Ok(results
            .into_iter()
            .filter_map(|r| r.url)
            .filter(|u| !u.is_empty())
            .collect())
    }
}

#[async_trait]
impl SearchProvider for FirecrawlProvider {
    async fn search(&self, query: &str, limit: usize) -> SearchResult<Vec<String>> {
        let url = format!("{}/v2/search", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .json(&SearchRequest { query, limit })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                provider: "firecrawl",
                status,
                body,
            });
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| SearchError::Decode {
            provider: "firecrawl",
            reason: e.to_string(),
        })?;

        let mut urls = Self::urls_from(parsed)?;
        urls.truncate(limit);
        Ok(urls)
    }

    fn name(&self) -> &'static str {
        "firecrawl"
    }

    fn pricing(&self) -> Pricing {
        PRICING
    }
}
