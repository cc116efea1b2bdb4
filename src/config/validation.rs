//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, thresholds > 0)
//! - Check the local prefix is a rooted path fragment
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatchConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::DispatchConfig;
use crate::dispatch::options::SlowThreshold;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("dispatch.name must not be empty")]
    EmptyName,

    #[error("dispatch.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("dispatch.{field} must be greater than zero or false")]
    ZeroThreshold { field: &'static str },

    #[error("dispatch.local_prefix '{0}' must start with '/' and must not end with '/'")]
    InvalidLocalPrefix(String),

    #[error("{field} '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let opts = &config.dispatch;

    if opts.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }

    if opts.timeout_ms == Some(0) {
        errors.push(ValidationError::ZeroTimeout);
    }

    for (field, threshold) in [
        ("slow_warning_local", opts.slow_warning_local),
        ("slow_warning_remote", opts.slow_warning_remote),
    ] {
        if threshold == Some(SlowThreshold::After(0)) {
            errors.push(ValidationError::ZeroThreshold { field });
        }
    }

    if let Some(prefix) = &opts.local_prefix {
        if !prefix.starts_with('/') || prefix.ends_with('/') {
            errors.push(ValidationError::InvalidLocalPrefix(prefix.clone()));
        }
    }

    for (field, value) in [
        ("server.bind_address", &config.server.bind_address),
        ("observability.metrics_address", &config.observability.metrics_address),
    ] {
        if value.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
