//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Check targets → Arm deadline → Read payload → Build client → Fan out
//!
//! Deadline (deadline.rs):
//!     Armed once per run; bounds the input read and outcome collection
//!
//! Shutdown (shutdown.rs):
//!     Deadline or fatal error → cancel every outstanding worker
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - No graceful drain: cancellation abandons in-flight requests

pub mod deadline;
pub mod shutdown;
pub mod startup;

pub use deadline::Deadline;
pub use shutdown::Shutdown;
