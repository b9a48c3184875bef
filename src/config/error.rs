//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid optimizer URL: must start with http:// or https://")]
    InvalidOptimizerUrl,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Poll interval must be at least one second")]
    InvalidPollInterval,

    #[error("Max poll attempts must be greater than zero")]
    InvalidPollAttempts,

    #[error("History limit must be greater than zero")]
    InvalidHistoryLimit,

    #[error("Unknown log format: {0}")]
    InvalidLogFormat(String),
}
