//! ATS Company Discovery
//!
//! Finds companies' public job boards on applicant tracking systems (Ashby,
//! Greenhouse, Lever, Workable) by running `site:`-restricted web searches,
//! reducing every hit to the board's canonical root URL, and merging new
//! boards into a per-platform CSV store.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ats_discovery::{
//!     Config, DiscoveryOptions, Orchestrator, PlatformRegistry, PlatformSelection, ProviderKind,
//! };
//!
//! let config = Config::from_env();
//! let orchestrator = Orchestrator::new(
//!     PlatformRegistry::builtin()?,
//!     config.provider_settings(ProviderKind::Firecrawl, 1),
//!     DiscoveryOptions::default(),
//!     &config.output_dir,
//! );
//!
//! let outcomes = orchestrator.run(&PlatformSelection::One("lever".into())).await?;
//! ```
//!
//! # Modules
//!
//! - [`platforms`] - Platform registry (domains, patterns, store locations)
//! - [`matcher`] - Canonical URL extraction
//! - [`strategy`] - Ordered search query templates
//! - [`search`] - Search provider trait and implementations
//! - [`discovery`] - The per-platform query loop and report
//! - [`merge`] - Discovered URL sets and the merge with existing state
//! - [`store`] - CSV store load and persist
//! - [`orchestrator`] - Single-platform and all-platform runs

pub mod budget;
pub mod config;
pub mod credentials;
pub mod discovery;
pub mod error;
pub mod matcher;
pub mod merge;
pub mod orchestrator;
pub mod platforms;
pub mod search;
pub mod store;
pub mod strategy;

// Re-export core types at crate root
pub use budget::{BudgetSnapshot, Pricing, QueryBudget};
pub use config::{Config, DiscoveryOptions};
pub use credentials::ApiKey;
pub use discovery::{discover_platform, DiscoveryLoop, DiscoveryReport, Session, StopReason};
pub use error::{DiscoveryError, SearchError, StoreError};
pub use matcher::{extract, CanonicalUrl, UrlPattern};
pub use merge::{merge, DiscoveredSet, MergeOutcome};
pub use orchestrator::{Orchestrator, PlatformOutcome, PlatformSelection};
pub use platforms::{PlatformConfig, PlatformRegistry};
pub use search::{ProviderFactory, ProviderKind, ProviderSettings, SearchProvider};
pub use strategy::{QueryStrategy, StrategyCategory};
