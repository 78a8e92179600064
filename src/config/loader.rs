//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::HelperConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for the schema.
    #[error("Invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file parsed but failed semantic checks.
    #[error("Config validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read, parse and validate a TOML configuration file.
pub fn load_config(path: &Path) -> Result<HelperConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: HelperConfig = toml::from_str(&content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(path = ?path, "Configuration loaded");
    Ok(config)
}
