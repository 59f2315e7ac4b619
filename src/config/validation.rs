//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, polling interval below deadline)
//! - Check that configured addresses decode
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::codec::TronAddress;
use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.rpc.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "rpc.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("rpc.base_url", e.to_string())),
    }

    if config.rpc.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.connect_timeout_secs", "must be > 0"));
    }
    if config.rpc.request_timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.request_timeout_secs", "must be > 0"));
    }
    if config.rpc.max_body_bytes == 0 {
        errors.push(ValidationError::new("rpc.max_body_bytes", "must be > 0"));
    }

    if config.polling.interval_ms == 0 {
        errors.push(ValidationError::new("polling.interval_ms", "must be > 0"));
    }
    if config.polling.max_wait() < config.polling.interval() {
        errors.push(ValidationError::new(
            "polling.max_wait_secs",
            "deadline is shorter than one polling interval",
        ));
    }

    if let Some(address) = &config.multicall.address {
        if let Err(e) = address.parse::<TronAddress>() {
            errors.push(ValidationError::new("multicall.address", e.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
