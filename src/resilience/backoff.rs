//! Fixed backoff between delivery attempts.

use std::time::Duration;

use crate::resilience::retries::RetryPolicy;

/// Delay to wait after `attempt` (1-based) failed, or `None` once the
/// attempt budget is spent.
///
/// The interval is constant: no exponential growth and no jitter.
pub fn delay_after(policy: &RetryPolicy, attempt: u32) -> Option<Duration> {
    policy.allows_retry_after(attempt).then(|| policy.backoff())
}
