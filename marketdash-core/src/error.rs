//! Error taxonomy for the dashboard.
//!
//! `SourceError` describes what went wrong at an I/O boundary (HTTP, HTML,
//! RSS, price API). `DashError` is the taxonomy the pipeline reports to the
//! presentation layer; every `SourceError` collapses into
//! `DashError::SourceUnavailable`.

use thiserror::Error;

/// Failure at an external data source.
///
/// These are designed to be displayable as a one-line warning in the CLI.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("no table with name and ticker columns at {url}")]
    NoMatchingTable { url: String },

    #[error("source error: {0}")]
    Other(String),
}

/// Errors surfaced by the dashboard pipeline.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("{origin} unavailable: {reason}")]
    SourceUnavailable { origin: String, reason: SourceError },

    #[error("insufficient history for {ticker}: {indicator} needs {needed} periods, have {available}")]
    InsufficientHistory {
        ticker: String,
        indicator: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("unknown index: {0}")]
    UnknownIndex(String),

    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl DashError {
    /// Wrap a source failure with the name of the source that produced it.
    pub fn unavailable(origin: impl Into<String>, reason: SourceError) -> Self {
        Self::SourceUnavailable {
            origin: origin.into(),
            reason,
        }
    }
}
