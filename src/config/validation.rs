//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and header well-formedness.
//! All problems are reported at once, not just the first.

use thiserror::Error;

use crate::config::schema::{parse_header_pair, MultipostConfig};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("retries must be at least 1")]
    ZeroRetries,

    #[error("time_limit must be greater than zero")]
    ZeroTimeLimit,

    #[error("input must name a file or '-'")]
    EmptyInput,

    #[error("header {name:?} is invalid: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// Check a configuration before it is accepted.
pub fn validate_config(config: &MultipostConfig) -> Result<(), Vec<ValidationError>> {
    let delivery = &config.delivery;
    let mut errors = Vec::new();

    if delivery.retries == 0 {
        errors.push(ValidationError::ZeroRetries);
    }
    if delivery.time_limit.is_zero() {
        errors.push(ValidationError::ZeroTimeLimit);
    }
    if delivery.input.is_empty() {
        errors.push(ValidationError::EmptyInput);
    }

    for (name, value) in &delivery.headers {
        if let Err(e) = parse_header_pair(name, value) {
            errors.push(ValidationError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            });
        }
    }
    if let Err(e) = delivery.user_agent_value() {
        errors.push(ValidationError::InvalidHeader {
            name: "user-agent".to_string(),
            reason: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
