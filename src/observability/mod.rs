//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging through `tracing`; every event carries its fields
//! - Diagnostics go to stderr so stdout stays free
//! - Each run gets a span with a random `run_id`; each target a `delivery` span

pub mod logging;
