//! Shared library for the MAL anime scraper.
//!
//! This crate provides common functionality used by the CLI and server
//! binaries:
//! - Configuration management
//! - Data models (anime records, output records)
//! - Logging infrastructure
//! - Shared error types

pub mod config;
pub mod error;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{FetchErrorKind, FetchFailure, ScrapeError};
pub use logging::LogConfig;
pub use models::{AnimeRecord, OutputRecord};

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
