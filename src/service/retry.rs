use std::time::Duration;

use crate::foundation::error::FlowResult;

/// Bounded retry with exponential backoff.
///
/// Only errors for which [`FlowError::is_retryable`](crate::FlowError::is_retryable) holds are
/// retried. The default is a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; `0` is treated as `1`.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the budget runs out.
    ///
    /// `op` receives the 1-based attempt number.
    pub fn run<T>(&self, mut op: impl FnMut(u32) -> FlowResult<T>) -> FlowResult<T> {
        let max = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(v) => return Ok(v),
                Err(e) if e.is_retryable() && attempt < max => {
                    let wait = self.backoff_after(attempt);
                    tracing::warn!(attempt, max, ?wait, error = %e, "retrying completion call");
                    std::thread::sleep(wait);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/retry.rs"]
mod tests;
