//! Optimizer service configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::job::PollPolicy;

use super::error::ValidationError;

/// Optimizer service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizerConfig {
    /// Base URL of the optimizer service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional bearer token sent with every request
    pub api_key: Option<Secret<String>>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Seconds between status polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Status polls before giving up
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

impl OptimizerConfig {
    /// Get the per-request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Polling schedule for submitted jobs
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_secs(self.poll_interval_secs),
            self.max_poll_attempts,
        )
    }

    /// Validate optimizer configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidOptimizerUrl);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.poll_interval_secs == 0 {
            return Err(ValidationError::InvalidPollInterval);
        }
        if self.max_poll_attempts == 0 {
            return Err(ValidationError::InvalidPollAttempts);
        }
        Ok(())
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            request_timeout_secs: default_request_timeout(),
            poll_interval_secs: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    5
}

fn default_max_poll_attempts() -> u32 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimizer_defaults() {
        let config = OptimizerConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert!(config.api_key.is_none());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.poll_policy(), PollPolicy::default());
    }

    #[test]
    fn test_validation_rejects_bad_scheme() {
        let config = OptimizerConfig {
            base_url: "ftp://optimizer".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidOptimizerUrl));
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        let zero_timeout = OptimizerConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(zero_timeout.validate(), Err(ValidationError::InvalidTimeout));

        let zero_interval = OptimizerConfig {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            zero_interval.validate(),
            Err(ValidationError::InvalidPollInterval)
        );

        let zero_attempts = OptimizerConfig {
            max_poll_attempts: 0,
            ..Default::default()
        };
        assert_eq!(
            zero_attempts.validate(),
            Err(ValidationError::InvalidPollAttempts)
        );
    }

    #[test]
    fn test_validation_valid_config() {
        let config = OptimizerConfig {
            base_url: "https://optimizer.example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
