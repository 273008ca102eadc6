//! Run orchestration.
//!
//! Order is fixed: targets are checked, the deadline is armed, the payload
//! is read, and only then is the HTTP client built and fan-out started. An
//! input failure therefore never reaches the network.

use tracing::Instrument;
use uuid::Uuid;

use crate::config::MultipostConfig;
use crate::delivery::{DeliveryWorker, ReqwestTransport};
use crate::error::{MultipostError, Result};
use crate::fanout::{FanOut, FanOutReport};
use crate::lifecycle::Deadline;
use crate::payload::{self, Payload};

/// Deliver the configured payload to every target.
///
/// Returns the report on overall success; aggregate failure, deadline expiry
/// and every other fatal condition come back as `Err`.
pub async fn run(config: &MultipostConfig, targets: &[String]) -> Result<FanOutReport> {
    if targets.is_empty() {
        return Err(MultipostError::NoTargets);
    }

    let delivery = &config.delivery;
    let deadline = Deadline::after(delivery.time_limit);
    let span = tracing::info_span!("run", run_id = %Uuid::new_v4());

    async move {
        tracing::debug!(
            targets = targets.len(),
            retries = delivery.retries,
            time_limit = ?delivery.time_limit,
            "Configuration loaded"
        );

        let raw = deadline.guard(payload::read_source(&delivery.input)).await??;
        let payload = Payload::prepare(raw, &delivery.param, delivery.header_set()?);
        tracing::debug!(
            bytes = payload.body().len(),
            remaining = ?deadline.remaining(),
            "Payload ready"
        );

        let transport = ReqwestTransport::new(delivery.user_agent_value()?)?;
        let worker = DeliveryWorker::new(transport, payload, delivery.retry_policy())
            .verbose(delivery.verbose);

        FanOut::new(worker)
            .with_deadline(deadline)
            .run(targets)
            .await?
            .into_result()
    }
    .instrument(span)
    .await
}
