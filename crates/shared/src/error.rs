//! Shared error types for the scraper.
//!
//! Three error classes drive control flow: configuration errors abort
//! before any fetch is issued, fetch failures are recorded per identifier
//! without stopping the batch, and sink errors abort the run because
//! output integrity can no longer be guaranteed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed fetch attempt.
///
/// Transient kinds are retried up to the configured limit; terminal kinds
/// fail immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// HTTP 404 - the MAL ID does not exist
    NotFound,
    /// HTTP 429 - throttled by the server
    RateLimited,
    /// HTTP 5xx
    ServerError,
    /// Connection, DNS or timeout failure
    Network,
    /// Response body could not be decoded
    Parse,
    /// Any other unexpected HTTP status
    Http,
}

impl FetchErrorKind {
    /// Whether a failure of this kind is worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchErrorKind::RateLimited | FetchErrorKind::ServerError | FetchErrorKind::Network
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::NotFound => "not_found",
            FetchErrorKind::RateLimited => "rate_limited",
            FetchErrorKind::ServerError => "server_error",
            FetchErrorKind::Network => "network",
            FetchErrorKind::Parse => "parse",
            FetchErrorKind::Http => "http",
        }
    }
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of a fetch attempt sequence for one identifier
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("fetch failed for MAL ID {mal_id} ({kind}) after {attempts} attempt(s): {message}")]
pub struct FetchFailure {
    pub mal_id: u32,
    pub kind: FetchErrorKind,
    pub attempts: u32,
    pub message: String,
}

/// Top-level error type for the scraping pipeline
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Missing or invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// A fetch sequence that ended in failure
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    /// Output sink write failure. Fatal: aborts the run.
    #[error("sink write failed: {0}")]
    Sink(#[from] std::io::Error),
}
