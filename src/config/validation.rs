//! Configuration validation.
//!
//! # Responsibilities
//! - Check value ranges (known log levels)
//! - Check the default target is usable for forwarding
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: HelperConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::config::schema::HelperConfig;
use crate::net::transport::{select_transport, Target};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &HelperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if let Some(raw) = &config.forwarding.default_target {
        match raw.parse::<Target>() {
            Ok(target) => {
                if target.host().is_none() {
                    errors.push(ValidationError::new(
                        "forwarding.default_target",
                        format!("'{}' has no host", raw),
                    ));
                }
                if let Err(e) = select_transport(&target) {
                    errors.push(ValidationError::new("forwarding.default_target", e.to_string()));
                }
            }
            Err(e) => errors.push(ValidationError::new(
                "forwarding.default_target",
                format!("invalid URL '{}': {}", raw, e),
            )),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
