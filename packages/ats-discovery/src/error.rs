//! Typed errors for the discovery library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell
//! a recoverable provider failure from a fatal store write.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can end a platform run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Configuration is invalid or incomplete
    #[error("config error: {0}")]
    Config(String),

    /// Platform name is not in the registry
    #[error("unknown platform: {name} (available: {available})")]
    UnknownPlatform { name: String, available: String },

    /// Provider API key is not configured
    #[error("{var} not found in environment")]
    MissingCredential { var: &'static str },

    /// Search provider failed
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    /// Persisted store failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Run was cancelled before results were persisted
    #[error("run cancelled")]
    Cancelled,
}

/// Errors raised by a search provider for a single query.
///
/// The discovery loop treats all of these as "zero results" and moves on.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("{provider} API error {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Response body could not be decoded
    #[error("{provider} response could not be decoded: {reason}")]
    Decode {
        provider: &'static str,
        reason: String,
    },

    /// Provider reported failure in an otherwise successful response
    #[error("{provider} rejected the request: {reason}")]
    Rejected {
        provider: &'static str,
        reason: String,
    },
}

/// Errors reading or writing the per-platform URL store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Existing store could not be opened or read
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Existing store is not valid CSV
    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Store could not be written
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Result type alias for search provider calls.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
