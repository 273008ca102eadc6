//! Per-attempt errors, per-target state, and the final delivery record.

use reqwest::StatusCode;
use thiserror::Error;

/// Why a single attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// The request itself is defective. Fatal for the whole run.
    #[error("{0}")]
    Construction(String),

    /// Connection, TLS, or protocol failure before a status was received.
    #[error("{0}")]
    Transport(String),

    /// A response arrived with a status outside [200, 300).
    #[error("http error: {0}")]
    Status(StatusCode),
}

impl AttemptError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, AttemptError::Construction(_))
    }
}

/// Lifecycle of one target's delivery.
///
/// ```text
/// Pending → Attempting → Succeeded
///                      → Attempting (after backoff)
///                      → Failed (attempts exhausted)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryState {
    Pending,
    Attempting { attempt: u32 },
    Succeeded { attempts: u32 },
    Failed { attempts: u32, error: AttemptError },
}

impl DeliveryState {
    pub fn name(&self) -> &'static str {
        match self {
            DeliveryState::Pending => "pending",
            DeliveryState::Attempting { .. } => "attempting",
            DeliveryState::Succeeded { .. } => "succeeded",
            DeliveryState::Failed { .. } => "failed",
        }
    }
}

/// Final result for one target. Exactly one is produced per target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub target: String,
    pub attempts: u32,
    pub error: Option<AttemptError>,
}

impl DeliveryOutcome {
    pub fn succeeded(target: impl Into<String>, attempts: u32) -> Self {
        Self {
            target: target.into(),
            attempts,
            error: None,
        }
    }

    pub fn failed(target: impl Into<String>, attempts: u32, error: AttemptError) -> Self {
        Self {
            target: target.into(),
            attempts,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
