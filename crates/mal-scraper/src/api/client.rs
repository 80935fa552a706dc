//! Jikan API client with rate limiting and retry logic.

use super::rate_limiter::RateLimiter;
use super::types::{AnimeDetails, AnimeDetailsResponse, JikanError};
use crate::orchestrator::Fetch;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::config::ScraperConfig;
use shared::{FetchErrorKind, FetchFailure, OutputRecord};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Jikan API v4 client
pub struct MalClient {
    /// HTTP client
    client: Client,
    /// Base URL for the Jikan API
    base_url: String,
    /// Rate limiter shared across concurrent fetches
    rate_limiter: RateLimiter,
    /// Maximum retries for transient failures
    max_retries: u32,
    /// Base delay for retry (exponential backoff)
    retry_delay_ms: u64,
}

impl MalClient {
    /// Create a new client
    pub fn new(
        base_url: String,
        requests_per_second: f64,
        requests_per_minute: u32,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("mal-anime-scraper/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            rate_limiter: RateLimiter::new(requests_per_second, requests_per_minute),
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create a client from the scraper section of the config
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.rate_limit.requests_per_second,
            config.rate_limit.requests_per_minute,
            config.max_retries,
            config.retry_delay_ms,
        )
    }

    /// Fetch full anime details by MAL ID
    ///
    /// Retries transient failures (network errors, HTTP 429 and 5xx) with
    /// exponential backoff up to `max_retries` extra attempts. Terminal
    /// failures (404, other client errors, undecodable bodies) fail
    /// immediately. Returns the details together with the number of
    /// attempts it took.
    pub async fn get_anime(&self, mal_id: u32) -> Result<(AnimeDetails, u32), FetchFailure> {
        let url = format!("{}/anime/{}", self.base_url, mal_id);
        let mut attempts: u32 = 0;

        loop {
            // Apply rate limiting before each attempt
            self.rate_limiter.acquire().await;
            attempts += 1;

            debug!(url = %url, attempt = attempts, "Making API request");

            let failure = match self.client.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        match response.json::<AnimeDetailsResponse>().await {
                            Ok(body) => {
                                debug!(mal_id = mal_id, "Request successful");
                                return Ok((body.data, attempts));
                            }
                            Err(e) => FetchFailure {
                                mal_id,
                                kind: FetchErrorKind::Parse,
                                attempts,
                                message: format!("failed to parse response: {}", e),
                            },
                        }
                    } else {
                        let kind = match status {
                            StatusCode::NOT_FOUND => FetchErrorKind::NotFound,
                            StatusCode::TOO_MANY_REQUESTS => FetchErrorKind::RateLimited,
                            s if s.is_server_error() => FetchErrorKind::ServerError,
                            _ => FetchErrorKind::Http,
                        };
                        // Jikan error bodies carry a message worth keeping
                        let message = match response.json::<JikanError>().await {
                            Ok(body) => format!("status {}: {}", status, body.message),
                            Err(_) => format!("status {} from {}", status, url),
                        };
                        FetchFailure {
                            mal_id,
                            kind,
                            attempts,
                            message,
                        }
                    }
                }
                Err(e) => FetchFailure {
                    mal_id,
                    kind: FetchErrorKind::Network,
                    attempts,
                    message: e.to_string(),
                },
            };

            if failure.kind.is_transient() && attempts <= self.max_retries {
                let delay = Duration::from_millis(
                    self.retry_delay_ms * 2u64.pow(attempts.saturating_sub(1)),
                );
                warn!(
                    mal_id = mal_id,
                    kind = %failure.kind,
                    delay_ms = delay.as_millis(),
                    "Transient failure, retrying after delay"
                );
                sleep(delay).await;
                continue;
            }

            warn!(
                mal_id = mal_id,
                kind = %failure.kind,
                attempts = attempts,
                "Fetch failed"
            );
            return Err(failure);
        }
    }

    /// Get the current number of requests in the last minute
    pub async fn rate_limit_count(&self) -> usize {
        self.rate_limiter.current_minute_count().await
    }
}

#[async_trait]
impl Fetch for MalClient {
    async fn fetch(&self, mal_id: u32) -> OutputRecord {
        match self.get_anime(mal_id).await {
            Ok((details, attempts)) => OutputRecord::success(mal_id, attempts, details.into()),
            Err(failure) => OutputRecord::failure(
                failure.mal_id,
                failure.attempts,
                failure.kind,
                failure.message,
            ),
        }
    }
}
