//! Retry with exponential backoff
//!
//! Every failure counts, whatever its kind: the endpoint fronts a language
//! model call, so a 500 or a dropped connection is worth another try. The
//! error from the final attempt is returned unchanged.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;

/// Attempt budget and backoff base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Delay after the failed attempt with zero-based index `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// All backoff delays a fully failing run would sleep through
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|attempt| self.backoff(attempt))
            .collect()
    }
}

/// Run `operation` until it succeeds or the attempt budget is spent
///
/// `sleep` is awaited between attempts, never after the last one. A policy
/// with zero attempts still runs the operation once.
pub async fn retry_with_backoff<T, E, F, Fut, S, SFut>(
    policy: &RetryPolicy,
    mut sleep: S,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::debug!(attempt = attempt + 1, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt + 1 >= max_attempts => {
                tracing::error!(
                    attempts = max_attempts,
                    error = %err,
                    "Request failed, retries exhausted"
                );
                return Err(err);
            }
            Err(err) => {
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts,
                    backoff_ms = delay.as_millis() as u64,
                    error = %err,
                    "Request failed, will retry after backoff"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
