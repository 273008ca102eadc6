//! Process-level error taxonomy.
//!
//! Every variant here ends the process. Per-attempt failures live in
//! [`AttemptError`](crate::delivery::AttemptError) and only surface as data on a
//! [`DeliveryOutcome`](crate::delivery::DeliveryOutcome).

use std::time::Duration;

use thiserror::Error;

use crate::config::duration::format_duration;
use crate::config::ConfigError;

/// Exit status for command-line usage errors (`EX_USAGE`).
pub const EXIT_USAGE: u8 = 64;

/// Exit status for every other fatal condition.
pub const EXIT_FAILURE: u8 = 1;

/// Fatal errors that abort a multipost run.
#[derive(Debug, Error)]
pub enum MultipostError {
    /// No destination URLs were supplied.
    #[error("no target URLs given")]
    NoTargets,

    /// Configuration file or flag value rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The payload source could not be read.
    #[error("error acquiring input from {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A request could not be built for a target. Never retried.
    #[error("error creating request for {target}: {reason}")]
    Construction { target: String, reason: String },

    /// The shared HTTP client could not be initialised.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The global time limit elapsed before every outcome was collected.
    #[error("reached absolute time limit of {}", format_limit(.0))]
    DeadlineExceeded(Duration),

    /// A worker stopped without reporting its outcome.
    #[error("collected {collected} of {expected} delivery outcomes")]
    Incomplete { collected: usize, expected: usize },

    /// At least one target exhausted its attempts.
    #[error("{failed} of {total} deliveries failed")]
    DeliveryFailures { failed: usize, total: usize },
}

impl MultipostError {
    pub fn construction(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::Construction {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MultipostError::NoTargets => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

fn format_limit(limit: &Duration) -> String {
    format_duration(*limit)
}

/// Result type for multipost operations.
pub type Result<T> = std::result::Result<T, MultipostError>;
