//! CLI for ATS company discovery.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ats_discovery::{
    Config, DiscoveryError, DiscoveryOptions, Orchestrator, PlatformOutcome, PlatformRegistry,
    PlatformSelection, ProviderKind,
};

#[derive(Parser)]
#[command(name = "ats-discovery")]
#[command(about = "Discover company job boards on ATS platforms via site: search")]
struct Cli {
    /// Platform to discover, or "all"
    #[arg(long, default_value = "all")]
    platform: PlatformSelection,

    /// Maximum search queries per platform
    #[arg(long, default_value_t = 15)]
    max_queries: usize,

    /// Results requested per query
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Search provider (firecrawl or serpapi)
    #[arg(long, default_value = "firecrawl")]
    provider: ProviderKind,

    /// Result pages fetched per query (serpapi only)
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Directory holding the per-platform CSV stores [env: DISCOVERY_OUTPUT_DIR]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Seconds to wait between queries
    #[arg(long, default_value_t = 10)]
    query_delay: u64,

    /// Seconds to wait between platforms in an "all" run
    #[arg(long, default_value_t = 2)]
    platform_delay: u64,

    /// Stop a platform run before spending more than this many credits
    #[arg(long)]
    max_credits: Option<u64>,

    /// Print per-platform reports as JSON
    #[arg(long)]
    json: bool,

    /// List the supported platforms and exit
    #[arg(long)]
    list_platforms: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ats_discovery=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    let registry = PlatformRegistry::builtin().context("Failed to build platform registry")?;

    if cli.list_platforms {
        for platform in registry.iter() {
            println!(
                "{:<12} {:<50} {:<16} {}",
                platform.name,
                platform.domains.join(", "),
                platform.csv_column,
                platform.output_file.display()
            );
        }
        return Ok(());
    }

    let config = Config::from_env();
    let output_dir = cli.output_dir.unwrap_or_else(|| config.output_dir.clone());

    let options = DiscoveryOptions::new()
        .with_max_queries(cli.max_queries)
        .with_limit_per_query(cli.limit)
        .with_query_delay(Duration::from_secs(cli.query_delay))
        .with_platform_delay(Duration::from_secs(cli.platform_delay))
        .with_max_credits(cli.max_credits);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling run");
            on_signal.cancel();
        }
    });

    let orchestrator = Orchestrator::new(
        registry,
        config.provider_settings(cli.provider, cli.pages),
        options,
        output_dir,
    )
    .with_cancellation(cancel);

    let outcomes = match orchestrator.run(&cli.platform).await {
        Ok(outcomes) => outcomes,
        Err(DiscoveryError::MissingCredential { var }) => {
            bail!(
                "{var} not found in environment; add it to your .env file ({var}=your_key_here)"
            );
        }
        Err(e) => return Err(e).context("Discovery failed"),
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcomes).context("Failed to serialize reports")?
        );
    } else {
        print_summary(&outcomes);
    }

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        bail!("{} of {} platforms failed", failed, outcomes.len());
    }

    Ok(())
}

fn print_summary(outcomes: &[PlatformOutcome]) {
    for outcome in outcomes {
        match (&outcome.report, &outcome.error) {
            (Some(report), _) => println!(
                "{:<12} queries={:<3} credits={:<4} cost=${:.3} found={:<4} new={:<4} total={:<5} {}",
                report.platform,
                report.budget.queries_issued,
                report.budget.credits_used,
                report.budget.cost_usd,
                report.companies_found,
                report.new_companies,
                report.total_companies,
                report.output_file.display()
            ),
            (None, Some(error)) => println!("{:<12} FAILED: {}", outcome.platform, error),
            (None, None) => {}
        }
    }
}
