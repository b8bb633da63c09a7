//! Runs discovery for one platform or sweeps the whole registry.

use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::DiscoveryOptions;
use crate::discovery::{self, DiscoveryReport};
use crate::error::{DiscoveryError, Result};
use crate::platforms::{PlatformConfig, PlatformRegistry};
use crate::search::ProviderFactory;

/// Which platforms to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformSelection {
    All,
    One(String),
}

impl FromStr for PlatformSelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(PlatformSelection::All)
        } else {
            Ok(PlatformSelection::One(s.trim().to_string()))
        }
    }
}

/// Result of one platform within a run.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformOutcome {
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<DiscoveryReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlatformOutcome {
    fn completed(report: DiscoveryReport) -> Self {
        Self {
            platform: report.platform.clone(),
            report: Some(report),
            error: None,
        }
    }

    fn failed(platform: &str, error: &DiscoveryError) -> Self {
        Self {
            platform: platform.to_string(),
            report: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Sequences platform runs.
///
/// Holds the registry, provider factory, and options for the lifetime of
/// the process; nothing here is mutated once constructed.
pub struct Orchestrator {
    registry: PlatformRegistry,
    providers: Box<dyn ProviderFactory>,
    options: DiscoveryOptions,
    output_dir: PathBuf,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        registry: PlatformRegistry,
        providers: impl ProviderFactory + 'static,
        options: DiscoveryOptions,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            providers: Box::new(providers),
            options,
            output_dir: output_dir.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned token (e.g. one tripped by Ctrl-C).
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    /// Run the selected platforms.
    ///
    /// A single-platform run returns its error directly. In an "all" sweep a
    /// failing platform is logged and recorded, and the sweep moves on;
    /// only cancellation ends it early.
    pub async fn run(&self, selection: &PlatformSelection) -> Result<Vec<PlatformOutcome>> {
        match selection {
            PlatformSelection::One(name) => {
                let platform = self.registry.get(name)?;
                let report = self.run_platform(platform).await?;
                Ok(vec![PlatformOutcome::completed(report)])
            }
            PlatformSelection::All => self.run_all().await,
        }
    }

    async fn run_all(&self) -> Result<Vec<PlatformOutcome>> {
        info!(
            platforms = self.registry.len(),
            queries_per_platform = self.options.max_queries,
            "Discovering all platforms"
        );

        let mut outcomes = Vec::with_capacity(self.registry.len());

        for (idx, platform) in self.registry.iter().enumerate() {
            if idx > 0 {
                discovery::pause(self.options.platform_delay, &self.cancel).await?;
            }

            match self.run_platform(platform).await {
                Ok(report) => outcomes.push(PlatformOutcome::completed(report)),
                Err(DiscoveryError::Cancelled) => {
                    warn!(platform = %platform.name, "Sweep cancelled");
                    return Err(DiscoveryError::Cancelled);
                }
                Err(e) => {
                    error!(platform = %platform.name, error = %e, "Platform run failed");
                    outcomes.push(PlatformOutcome::failed(&platform.name, &e));
                }
            }
        }

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!(
            completed = outcomes.len() - failed,
            failed,
            "All platforms discovered"
        );

        Ok(outcomes)
    }

    async fn run_platform(&self, platform: &PlatformConfig) -> Result<DiscoveryReport> {
        let provider = self.providers.build()?;

        discovery::discover_platform(
            platform,
            provider.as_ref(),
            &self.options,
            &self.output_dir,
            &self.cancel,
        )
        .await
    }
}
