use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::credentials::ApiKey;
use crate::search::{
    ProviderKind, ProviderSettings, DEFAULT_FIRECRAWL_API_URL, DEFAULT_SERPAPI_API_URL,
};

/// Process configuration loaded from environment variables.
///
/// API keys are optional here; a missing key only fails the platform runs
/// that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub firecrawl_api_key: Option<ApiKey>,
    pub serpapi_api_key: Option<ApiKey>,
    pub firecrawl_api_url: String,
    pub serpapi_api_url: String,
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        // Load .env file if present (development)
        let _ = dotenv();

        Self {
            firecrawl_api_key: ApiKey::from_env(ProviderKind::Firecrawl.api_key_var()),
            serpapi_api_key: ApiKey::from_env(ProviderKind::SerpApi.api_key_var()),
            firecrawl_api_url: env::var("FIRECRAWL_API_URL")
                .unwrap_or_else(|_| DEFAULT_FIRECRAWL_API_URL.to_string()),
            serpapi_api_url: env::var("SERPAPI_API_URL")
                .unwrap_or_else(|_| DEFAULT_SERPAPI_API_URL.to_string()),
            output_dir: env::var("DISCOVERY_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Settings for constructing `kind`'s provider.
    pub fn provider_settings(
        &self,
        kind: ProviderKind,
        pages_per_query: u32,
    ) -> ProviderSettings {
        let (api_key, base_url) = match kind {
            ProviderKind::Firecrawl => (&self.firecrawl_api_key, &self.firecrawl_api_url),
            ProviderKind::SerpApi => (&self.serpapi_api_key, &self.serpapi_api_url),
        };

        ProviderSettings {
            kind,
            api_key: api_key.clone(),
            base_url: base_url.clone(),
            pages_per_query,
        }
    }
}

/// Knobs for a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Maximum queries per platform.
    ///
    /// Default: 15 (the full strategy list).
    pub max_queries: usize,

    /// Results requested per query. Default: 10.
    pub limit_per_query: usize,

    /// Pause between consecutive queries. Default: 10s.
    pub query_delay: Duration,

    /// Pause between platforms in an "all" sweep. Default: 2s.
    pub platform_delay: Duration,

    /// Stop a platform run before exceeding this many credits.
    ///
    /// Default: None (no ceiling).
    pub max_credits: Option<u64>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_queries: 15,
            limit_per_query: 10,
            query_delay: Duration::from_secs(10),
            platform_delay: Duration::from_secs(2),
            max_credits: None,
        }
    }
}

impl DiscoveryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_queries(mut self, max: usize) -> Self {
        self.max_queries = max;
        self
    }

    pub fn with_limit_per_query(mut self, limit: usize) -> Self {
        self.limit_per_query = limit;
        self
    }

    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    pub fn with_platform_delay(mut self, delay: Duration) -> Self {
        self.platform_delay = delay;
        self
    }

    pub fn with_max_credits(mut self, max_credits: Option<u64>) -> Self {
        self.max_credits = max_credits;
        self
    }

    /// No pacing at all, for tests and dry runs against mocks.
    pub fn without_delays(self) -> Self {
        self.with_query_delay(Duration::ZERO)
            .with_platform_delay(Duration::ZERO)
    }
}
