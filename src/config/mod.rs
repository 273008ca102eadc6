//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → loader.rs (optional TOML file, parse & deserialize)
//!     → cli.rs (command-line flags override file values)
//!     → validation.rs (semantic checks, on the merged result only)
//!     → MultipostConfig (validated, immutable for the run)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved; nothing mutates it after fan-out starts
//! - All fields have defaults to allow minimal configs
//! - Durations use Go syntax (`30s`, `15m`) in files and flags alike

pub mod duration;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{read_config, ConfigError};
pub use schema::{DeliveryConfig, MultipostConfig};
pub use validation::{validate_config, ValidationError};
