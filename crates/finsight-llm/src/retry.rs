//! Bounded retry with exponential backoff for transient provider errors.
//!
//! Only errors classified by [`LLMError::is_transient`] are retried, and only
//! against the same provider. A rate-limit hint from the provider replaces the
//! computed delay but is still capped at `max_delay`.

use std::time::Duration;

use crate::types::LLMError;

/// Configuration for retry behavior on transient provider errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`, capped
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Delay to wait after `error` on retry number `retry`
    pub fn delay_for(&self, retry: u32, error: &LLMError) -> Duration {
        match error {
            LLMError::RateLimited {
                retry_after_seconds: Some(seconds),
            } => Duration::from_secs(*seconds).min(self.max_delay),
            _ => self.backoff(retry),
        }
    }

    /// Whether another attempt may follow attempt number `attempt` that failed with `error`
    pub fn should_retry(&self, attempt: u32, error: &LLMError) -> bool {
        error.is_transient() && attempt < self.max_attempts
    }
}
