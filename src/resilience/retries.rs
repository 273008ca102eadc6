//! Retry policy and outcome classification.
//!
//! # Design Decisions
//! - Every non-2xx status and every transport error is retried the same way
//! - The policy is a plain value, copied into each worker

use std::time::Duration;

use reqwest::StatusCode;

/// Attempt budget and fixed wait between attempts for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` below 1 is raised to 1.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(30))
    }
}

/// A response counts as delivered iff its status lies in [200, 300).
pub fn is_success_status(status: StatusCode) -> bool {
    (200..300).contains(&status.as_u16())
}
