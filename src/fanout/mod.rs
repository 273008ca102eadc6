//! Fan-out subsystem.
//!
//! # Data Flow
//! ```text
//! targets[]
//!     → coordinator.rs (one task per target, shared DeliveryWorker)
//!     → mpsc channel (many workers, one collector)
//!     → select! { all outcomes collected | deadline elapsed }
//!     → FanOutReport (failure count decides the exit status)
//! ```

pub mod coordinator;

pub use coordinator::{FanOut, FanOutReport};
