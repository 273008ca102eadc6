//! Concurrent HTTP POST fan-out with per-target retries.

pub mod cli;
pub mod config;
pub mod delivery;
pub mod error;
pub mod fanout;
pub mod lifecycle;
pub mod observability;
pub mod payload;
pub mod resilience;

pub use config::MultipostConfig;
pub use delivery::{DeliveryOutcome, DeliveryWorker};
pub use error::{MultipostError, Result};
pub use fanout::{FanOut, FanOutReport};
pub use lifecycle::startup::run;
