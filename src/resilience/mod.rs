//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt against a target:
//!     → retries.rs (classify status, check attempt budget)
//!     → On failure: backoff.rs (fixed wait before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Retries are per target; nothing is shared or budgeted across targets
//! - Transport errors and non-2xx statuses are treated identically

pub mod backoff;
pub mod retries;

pub use retries::{is_success_status, RetryPolicy};
