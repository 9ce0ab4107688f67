//! Exponential backoff for backend HTTP calls.
//!
//! Only transport failures (connect errors, timeouts) are retried. A
//! response with any status code is returned to the caller as-is.

use std::future::Future;
use std::time::Duration;

/// How many times, and how patiently, to retry a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// 3 retries after the first attempt: 200ms, 400ms, 800ms
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Call `send` until it yields a response or the retries run out.
    pub(crate) async fn send<F, Fut>(&self, endpoint: &str, send: F) -> Result<reqwest::Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        for attempt in 0..self.max_retries {
            match send().await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    let delay = self.delay(attempt);
                    tracing::warn!(
                        endpoint,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        "storage request failed, retrying in {:?}: {}",
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
        send().await
    }
}
