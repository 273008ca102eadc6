//! Delivery subsystem.
//!
//! # Data Flow
//! ```text
//! target URL
//!     → worker.rs (parse target, run the attempt loop)
//!     → transport.rs (POST payload + headers, report status)
//!     → resilience (classify, back off, enforce attempt limit)
//!     → outcome.rs (one DeliveryOutcome per target)
//! ```

pub mod outcome;
pub mod transport;
pub mod worker;

pub use outcome::{AttemptError, DeliveryOutcome, DeliveryState};
pub use transport::{OutboundRequest, ReqwestTransport, Transport};
pub use worker::DeliveryWorker;
