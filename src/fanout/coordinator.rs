//! Fan-out coordinator.
//!
//! # Responsibilities
//! - Spawn one delivery task per target, all before collecting anything
//! - Collect exactly one outcome per task, in arrival order
//! - Race collection against the global deadline
//! - Aggregate outcomes into a report
//!
//! # Design Decisions
//! - Outcomes travel over a bounded mpsc channel sized to the target count,
//!   so a worker's send never waits
//! - Deadline expiry and fatal construction errors cancel the root scope;
//!   no partial result is reported
//! - The coordinator never retries on a worker's behalf

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::Instrument;

use crate::delivery::{DeliveryOutcome, DeliveryWorker, Transport};
use crate::error::{MultipostError, Result};
use crate::lifecycle::{Deadline, Shutdown};

/// Aggregate of every collected outcome.
#[derive(Debug, Clone, Default)]
pub struct FanOutReport {
    outcomes: Vec<DeliveryOutcome>,
}

impl FanOutReport {
    pub fn new(outcomes: Vec<DeliveryOutcome>) -> Self {
        Self { outcomes }
    }

    /// Outcomes in collection order, which need not match launch order.
    pub fn outcomes(&self) -> &[DeliveryOutcome] {
        &self.outcomes
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeliveryOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    /// Turn an aggregate failure into `DeliveryFailures`.
    pub fn into_result(self) -> Result<Self> {
        match self.failure_count() {
            0 => Ok(self),
            failed => Err(MultipostError::DeliveryFailures {
                failed,
                total: self.total(),
            }),
        }
    }
}

type Collected = Result<DeliveryOutcome>;

/// Runs one shared [`DeliveryWorker`] against many targets concurrently.
pub struct FanOut<T> {
    worker: Arc<DeliveryWorker<T>>,
    deadline: Option<Deadline>,
}

impl<T: Transport> FanOut<T> {
    pub fn new(worker: DeliveryWorker<T>) -> Self {
        Self {
            worker: Arc::new(worker),
            deadline: None,
        }
    }

    /// Abort the whole run if collection is still incomplete at `deadline`.
    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deliver to every target and collect one outcome each.
    ///
    /// Duplicate targets are delivered independently.
    pub async fn run(&self, targets: &[String]) -> Result<FanOutReport> {
        if targets.is_empty() {
            return Err(MultipostError::NoTargets);
        }

        let scope = Shutdown::new();
        let (tx, mut rx) = mpsc::channel::<Collected>(targets.len());

        for target in targets {
            self.spawn_worker(target.clone(), tx.clone(), &scope);
        }
        drop(tx);

        tracing::debug!(targets = targets.len(), "Fan-out started");

        let collected = self.collect(&mut rx, targets.len()).await;
        if collected.is_err() {
            let cancelled = scope.trigger();
            tracing::debug!(cancelled, "Cancelled outstanding deliveries");
        }
        let report = FanOutReport::new(collected?);

        for failure in report.failures() {
            if let Some(error) = &failure.error {
                tracing::error!(
                    url = %failure.target,
                    attempts = failure.attempts,
                    error = %error,
                    "Delivery failed"
                );
            }
        }
        tracing::info!(
            total = report.total(),
            failed = report.failure_count(),
            "Fan-out complete"
        );

        Ok(report)
    }

    fn spawn_worker(&self, target: String, tx: mpsc::Sender<Collected>, scope: &Shutdown) {
        let worker = Arc::clone(&self.worker);
        let mut cancelled = scope.subscribe();
        let span = tracing::info_span!("delivery", url = %target);

        tokio::spawn(
            async move {
                tokio::select! {
                    result = worker.deliver(&target) => {
                        // Capacity equals the target count, so this never waits.
                        let _ = tx.send(result).await;
                    }
                    _ = cancelled.recv() => {
                        tracing::debug!("Delivery cancelled");
                    }
                }
            }
            .instrument(span),
        );
    }

    /// Receive exactly `expected` outcomes, or fail on the first fatal
    /// error or the deadline, whichever comes first.
    async fn collect(
        &self,
        rx: &mut mpsc::Receiver<Collected>,
        expected: usize,
    ) -> Result<Vec<DeliveryOutcome>> {
        let mut outcomes = Vec::with_capacity(expected);

        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(deadline) => deadline.elapsed().await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expired);

        while outcomes.len() < expected {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(Ok(outcome)) => outcomes.push(outcome),
                    Some(Err(fatal)) => return Err(fatal),
                    None => {
                        return Err(MultipostError::Incomplete {
                            collected: outcomes.len(),
                            expected,
                        });
                    }
                },
                _ = &mut expired => {
                    let limit = self.deadline.map(|d| d.limit()).unwrap_or_default();
                    tracing::error!(
                        collected = outcomes.len(),
                        expected,
                        "Reached absolute time limit"
                    );
                    return Err(MultipostError::DeadlineExceeded(limit));
                }
            }
        }

        Ok(outcomes)
    }
}
