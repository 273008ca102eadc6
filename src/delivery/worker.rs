//! Delivery worker: the retry loop for a single target.
//!
//! # Responsibilities
//! - Validate the target before any network traffic
//! - Attempt the POST up to the policy's limit, waiting between failures
//! - Emit exactly one [`DeliveryOutcome`]
//!
//! Fatal construction defects are returned as `Err`; everything else is data.

use url::Url;

use crate::delivery::outcome::{AttemptError, DeliveryOutcome, DeliveryState};
use crate::delivery::transport::{OutboundRequest, Transport};
use crate::error::{MultipostError, Result};
use crate::payload::Payload;
use crate::resilience::backoff;
use crate::resilience::{is_success_status, RetryPolicy};

/// Delivers one shared payload to a target, retrying on failure.
///
/// A single worker is shared by every fan-out task; it holds only
/// read-only state.
#[derive(Debug)]
pub struct DeliveryWorker<T> {
    transport: T,
    payload: Payload,
    policy: RetryPolicy,
    verbose: bool,
}

impl<T: Transport> DeliveryWorker<T> {
    pub fn new(transport: T, payload: Payload, policy: RetryPolicy) -> Self {
        Self {
            transport,
            payload,
            policy,
            verbose: false,
        }
    }

    /// Log every attempt, not only failed ones.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run the delivery state machine for `target` to a terminal state.
    pub async fn deliver(&self, target: &str) -> Result<DeliveryOutcome> {
        let url = parse_target(target)?;
        let mut state = DeliveryState::Pending;

        loop {
            state = match state {
                DeliveryState::Pending => DeliveryState::Attempting { attempt: 1 },
                DeliveryState::Attempting { attempt } => {
                    self.attempt(target, &url, attempt).await?
                }
                DeliveryState::Succeeded { attempts } => {
                    return Ok(DeliveryOutcome::succeeded(target, attempts));
                }
                DeliveryState::Failed { attempts, error } => {
                    return Ok(DeliveryOutcome::failed(target, attempts, error));
                }
            };
            tracing::debug!(url = %target, state = state.name(), "Delivery state changed");
        }
    }

    /// One send plus, on failure, the backoff wait before the next state.
    async fn attempt(&self, target: &str, url: &Url, attempt: u32) -> Result<DeliveryState> {
        if self.verbose {
            tracing::info!(url = %target, attempt, "Trying");
        }

        let request = OutboundRequest {
            url: url.clone(),
            headers: self.payload.headers().clone(),
            body: self.payload.body().clone(),
            attempt,
        };

        let error = match self.transport.send(request).await {
            Ok(status) if is_success_status(status) => {
                return Ok(DeliveryState::Succeeded { attempts: attempt });
            }
            Ok(status) => AttemptError::Status(status),
            Err(e) if e.is_fatal() => return Err(MultipostError::construction(target, e)),
            Err(e) => e,
        };

        tracing::warn!(
            url = %target,
            attempt,
            max_attempts = self.policy.max_attempts(),
            error = %error,
            "Delivery attempt failed"
        );

        match backoff::delay_after(&self.policy, attempt) {
            Some(delay) => {
                tokio::time::sleep(delay).await;
                Ok(DeliveryState::Attempting {
                    attempt: attempt + 1,
                })
            }
            None => Ok(DeliveryState::Failed {
                attempts: attempt,
                error,
            }),
        }
    }
}

/// Reject targets that can never form a valid request.
pub fn parse_target(target: &str) -> Result<Url> {
    let url = Url::parse(target).map_err(|e| MultipostError::construction(target, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(MultipostError::construction(
            target,
            format!("unsupported URL scheme {other:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::transport::scripted::FnTransport;
    use crate::payload::HeaderSet;
    use bytes::Bytes;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    fn payload() -> Payload {
        Payload::prepare(Bytes::from_static(b"hello"), "payload", HeaderSet::new())
    }

    /// Fails with `status` until `succeed_on`, then returns 200.
    fn flaky(
        calls: Arc<AtomicU32>,
        succeed_on: u32,
        status: u16,
    ) -> FnTransport<impl Fn(&OutboundRequest) -> std::result::Result<StatusCode, AttemptError> + Send + Sync + 'static>
    {
        FnTransport::new(move |_req: &OutboundRequest| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= succeed_on {
                Ok(StatusCode::OK)
            } else {
                Ok(StatusCode::from_u16(status).unwrap())
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_kth_attempt_waits_k_minus_one_times() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(5, Duration::from_secs(10));
        let worker = DeliveryWorker::new(flaky(calls.clone(), 3, 503), payload(), policy);

        let start = Instant::now();
        let outcome = worker.deliver("http://example.test/hook").await.unwrap();
        let elapsed = start.elapsed();

        assert!(outcome.is_success());
        assert_eq!(outcome.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(elapsed >= Duration::from_secs(20) && elapsed < Duration::from_secs(21));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_carry_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_secs(30));
        let worker = DeliveryWorker::new(flaky(calls.clone(), u32::MAX, 500), payload(), policy);

        let start = Instant::now();
        let outcome = worker.deliver("http://example.test/hook").await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(outcome.attempts, 3);
        assert_eq!(
            outcome.error,
            Some(AttemptError::Status(StatusCode::INTERNAL_SERVER_ERROR))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(elapsed >= Duration::from_secs(60) && elapsed < Duration::from_secs(61));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_never_waits() {
        let calls = Arc::new(AtomicU32::new(0));
        let worker = DeliveryWorker::new(flaky(calls.clone(), 1, 500), payload(), RetryPolicy::default());

        let start = Instant::now();
        let outcome = worker.deliver("https://example.test/").await.unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.attempts, 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let transport = FnTransport::new(move |_req: &OutboundRequest| {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Err(AttemptError::Transport("connection reset".into())),
                _ => Ok(StatusCode::NO_CONTENT),
            }
        });
        let worker = DeliveryWorker::new(transport, payload(), RetryPolicy::new(2, Duration::from_secs(1)));

        let outcome = worker.deliver("http://example.test/").await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_reason_wins() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let transport = FnTransport::new(move |_req: &OutboundRequest| {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Ok(StatusCode::BAD_GATEWAY),
                _ => Err(AttemptError::Transport("timed out".into())),
            }
        });
        let worker = DeliveryWorker::new(transport, payload(), RetryPolicy::new(2, Duration::ZERO));

        let outcome = worker.deliver("http://example.test/").await.unwrap();
        assert_eq!(outcome.error, Some(AttemptError::Transport("timed out".into())));
    }

    #[tokio::test]
    async fn test_malformed_target_is_fatal_without_sending() {
        let calls = Arc::new(AtomicU32::new(0));
        let worker = DeliveryWorker::new(flaky(calls.clone(), 1, 200), payload(), RetryPolicy::default());

        let err = worker.deliver("not a url").await.unwrap_err();
        assert!(matches!(err, MultipostError::Construction { ref target, .. } if target == "not a url"));

        let err = worker.deliver("ftp://example.test/file").await.unwrap_err();
        assert!(err.to_string().contains("unsupported URL scheme"));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_construction_error_from_transport_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let transport = FnTransport::new(move |_req: &OutboundRequest| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(AttemptError::Construction("invalid header".into()))
        });
        let worker = DeliveryWorker::new(transport, payload(), RetryPolicy::new(5, Duration::ZERO));

        let err = worker.deliver("http://example.test/").await.unwrap_err();
        assert!(matches!(err, MultipostError::Construction { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Log sink shared between the subscriber and the assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn count(&self, message: &str) -> usize {
            let text = String::from_utf8(self.0.lock().unwrap().clone()).unwrap();
            text.lines().filter(|line| line.contains(message)).count()
        }
    }

    /// Succeeds on the third of five attempts and returns what was logged.
    async fn logged_delivery(verbose: bool) -> CapturedLogs {
        let logs = CapturedLogs::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(5, Duration::from_secs(1));
        let worker = DeliveryWorker::new(flaky(calls, 3, 503), payload(), policy).verbose(verbose);
        let outcome = worker.deliver("http://example.test/hook").await.unwrap();
        assert_eq!(outcome.attempts, 3);

        logs
    }

    #[tokio::test(start_paused = true)]
    async fn test_verbose_logs_every_attempt() {
        let logs = logged_delivery(true).await;
        assert_eq!(logs.count("Trying"), 3);
        assert_eq!(logs.count("Delivery attempt failed"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_logs_only_failed_attempts() {
        let logs = logged_delivery(false).await;
        assert_eq!(logs.count("Trying"), 0);
        assert_eq!(logs.count("Delivery attempt failed"), 2);
    }

    #[tokio::test]
    async fn test_every_attempt_carries_shared_payload() {
        let seen: Arc<Mutex<Vec<(u32, Bytes, Option<String>)>>> = Arc::default();
        let sink = seen.clone();
        let transport = FnTransport::new(move |req: &OutboundRequest| {
            let content_type = req
                .headers
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            sink.lock().unwrap().push((req.attempt, req.body.clone(), content_type));
            Ok(StatusCode::SERVICE_UNAVAILABLE)
        });
        let worker = DeliveryWorker::new(transport, payload(), RetryPolicy::new(2, Duration::ZERO));

        worker.deliver("http://example.test/").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        for (i, (attempt, body, content_type)) in seen.iter().enumerate() {
            assert_eq!(*attempt, i as u32 + 1);
            assert_eq!(&body[..], b"payload=hello");
            assert_eq!(content_type.as_deref(), Some("application/x-www-form-urlencoded"));
        }
    }
}
