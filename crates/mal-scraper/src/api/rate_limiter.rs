//! Rate limiter enforcing per-second and per-minute request limits.
//!
//! Shared across concurrent fetch workers; admission is serialized through
//! an internal lock so the limits hold for the process as a whole.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Default)]
struct LimiterState {
    /// Last request timestamp
    last_request: Option<Instant>,
    /// Request timestamps in the last minute
    recent_requests: Vec<Instant>,
}

/// Rate limiter with dual constraints (per-second and per-minute)
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum requests per second
    max_per_second: f64,
    /// Maximum requests per minute
    max_per_minute: u32,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(max_per_second: f64, max_per_minute: u32) -> Self {
        Self {
            max_per_second,
            max_per_minute,
            state: Mutex::new(LimiterState::default()),
        }
    }

    /// Wait until a request can be made, respecting both rate limits
    ///
    /// Holds the internal lock while waiting, which serializes admission
    /// across workers.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        // Clean up requests older than 1 minute
        state
            .recent_requests
            .retain(|&timestamp| now.duration_since(timestamp) < Duration::from_secs(60));

        // Check per-minute limit
        if state.recent_requests.len() >= self.max_per_minute as usize {
            // Wait until the oldest request is more than 1 minute old
            if let Some(&oldest) = state.recent_requests.first() {
                let elapsed = now.duration_since(oldest);
                if elapsed < Duration::from_secs(60) {
                    let wait_time = Duration::from_secs(60) - elapsed;
                    tracing::debug!(
                        wait_ms = wait_time.as_millis(),
                        "Rate limit: waiting for per-minute limit"
                    );
                    sleep(wait_time).await;
                }
            }
        }

        // Check per-second limit
        if let Some(last) = state.last_request {
            let elapsed = Instant::now().duration_since(last);
            let min_interval = Duration::from_secs_f64(1.0 / self.max_per_second);

            if elapsed < min_interval {
                let wait_time = min_interval - elapsed;
                tracing::debug!(
                    wait_ms = wait_time.as_millis(),
                    "Rate limit: waiting for per-second limit"
                );
                sleep(wait_time).await;
            }
        }

        // Record this request
        let request_time = Instant::now();
        state.last_request = Some(request_time);
        state.recent_requests.push(request_time);
    }

    /// Get the current number of requests in the last minute
    pub async fn current_minute_count(&self) -> usize {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        state
            .recent_requests
            .retain(|&timestamp| now.duration_since(timestamp) < Duration::from_secs(60));
        state.recent_requests.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_rate_limiter_per_second() {
        let limiter = RateLimiter::new(2.0, 50);

        let start = Instant::now();

        // Make 3 requests - should take at least 1 second
        for _ in 0..3 {
            limiter.acquire().await;
        }

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(900)); // Allow some tolerance
    }

    #[tokio::test]
    async fn test_rate_limiter_per_minute() {
        let limiter = RateLimiter::new(100.0, 3); // High per-second, low per-minute

        let start = Instant::now();

        // Make 4 requests - should trigger per-minute limit
        for i in 0..4 {
            limiter.acquire().await;
            if i == 3 {
                // Fourth request should have waited
                let elapsed = start.elapsed();
                assert!(elapsed >= Duration::from_millis(50)); // Should have some delay
            }
        }
    }

    #[tokio::test]
    async fn test_shared_across_tasks() {
        let limiter = Arc::new(RateLimiter::new(4.0, 50));

        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // 4 concurrent tasks at 4 req/s: the last admission waits ~750ms
        assert!(start.elapsed() >= Duration::from_millis(700));
        assert_eq!(limiter.current_minute_count().await, 4);
    }

    #[tokio::test]
    async fn test_current_minute_count() {
        let limiter = RateLimiter::new(2.0, 50);
        assert_eq!(limiter.current_minute_count().await, 0);
    }
}
