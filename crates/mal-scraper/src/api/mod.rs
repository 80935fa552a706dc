//! Jikan API v4 client implementation.
//!
//! This module provides a rate-limited, retry-enabled client for fetching
//! anime details from the Jikan API (MyAnimeList unofficial API).

pub mod client;
pub mod rate_limiter;
pub mod types;

pub use client::MalClient;
pub use rate_limiter::RateLimiter;
pub use types::*;
