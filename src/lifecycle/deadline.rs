//! Absolute time budget for a run.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{MultipostError, Result};

/// A fixed point in time after which the run is abandoned.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    limit: Duration,
}

impl Deadline {
    /// Arm a deadline `limit` from now.
    pub fn after(limit: Duration) -> Self {
        Self {
            at: Instant::now() + limit,
            limit,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Resolves once the deadline has passed.
    pub async fn elapsed(self) {
        tokio::time::sleep_until(self.at).await;
    }

    /// Run `fut`, failing with `DeadlineExceeded` if it outlives the deadline.
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output> {
        tokio::time::timeout_at(self.at, fut)
            .await
            .map_err(|_| MultipostError::DeadlineExceeded(self.limit))
    }
}
