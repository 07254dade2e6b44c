use std::fmt::Display;
use std::future::Future;

use tracing::warn;

/// Re-attempts allowed after the first try unless configured otherwise.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// How many times a failed operation is re-attempted.
///
/// Attempts run back to back with no delay: failures are expected to be
/// independent between calls, and each attempt re-rolls its inputs anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Attempt exactly once.
    pub const fn disabled() -> Self {
        Self::new(0)
    }

    /// Build a policy from an untrusted signed budget; negatives mean no retries.
    pub fn from_signed(max_retries: i64) -> Self {
        Self::new(u32::try_from(max_retries.max(0)).unwrap_or(u32::MAX))
    }

    pub const fn max_retries(self) -> u32 {
        self.max_retries
    }

    /// Worst-case number of invocations, including the first.
    pub fn max_attempts(self) -> u64 {
        u64::from(self.max_retries) + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

/// Run `operation` until it succeeds or the policy's budget is spent.
///
/// Each attempt is awaited to completion before the next begins. The first
/// success is returned as-is; once the budget is exhausted the last error is
/// returned unchanged.
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut remaining = policy.max_retries;
    let mut attempt: u64 = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if remaining == 0 => return Err(err),
            Err(err) => {
                warn!(attempt, remaining, error = %err, "attempt failed, retrying");
                remaining -= 1;
                attempt += 1;
            }
        }
    }
}
