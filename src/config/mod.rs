//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `QUANTUM_MORPH` prefix and nested values use double underscores as separators.
//! Every setting has a default, so an empty environment yields a working config.
//!
//! # Example
//!
//! ```no_run
//! use quantum_morph::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Optimizer at {}", config.optimizer.base_url);
//! ```

mod error;
mod logging;
mod optimizer;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use optimizer::OptimizerConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Optimizer service (URL, token, polling schedule)
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    /// Local storage for wizard state, history and exports
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log level and output format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `QUANTUM_MORPH` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `QUANTUM_MORPH__OPTIMIZER__BASE_URL=...` -> `optimizer.base_url = ...`
    /// - `QUANTUM_MORPH__STORAGE__HISTORY_LIMIT=50` -> `storage.history_limit = 50`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("QUANTUM_MORPH")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.optimizer.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::path::PathBuf;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "QUANTUM_MORPH__OPTIMIZER__BASE_URL",
        "QUANTUM_MORPH__OPTIMIZER__API_KEY",
        "QUANTUM_MORPH__OPTIMIZER__MAX_POLL_ATTEMPTS",
        "QUANTUM_MORPH__STORAGE__DATA_DIR",
        "QUANTUM_MORPH__STORAGE__HISTORY_LIMIT",
        "QUANTUM_MORPH__LOGGING__FORMAT",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.optimizer.max_poll_attempts, 120);
        assert_eq!(config.storage.history_limit, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("QUANTUM_MORPH__OPTIMIZER__BASE_URL", "https://optimizer.test");
        env::set_var("QUANTUM_MORPH__OPTIMIZER__API_KEY", "qm-token");
        env::set_var("QUANTUM_MORPH__OPTIMIZER__MAX_POLL_ATTEMPTS", "7");
        env::set_var("QUANTUM_MORPH__STORAGE__DATA_DIR", "/tmp/qm");
        env::set_var("QUANTUM_MORPH__LOGGING__FORMAT", "json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.optimizer.base_url, "https://optimizer.test");
        assert_eq!(
            config
                .optimizer
                .api_key
                .as_ref()
                .map(|k| k.expose_secret().as_str()),
            Some("qm-token")
        );
        assert_eq!(config.optimizer.max_poll_attempts, 7);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/qm"));
        assert_eq!(config.logging.log_format(), Ok(LogFormat::Json));
    }

    #[test]
    fn test_api_key_is_redacted_in_debug_output() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("QUANTUM_MORPH__OPTIMIZER__API_KEY", "qm-token");
        let result = AppConfig::load();
        clear_env();

        let debug = format!("{:?}", result.unwrap());
        assert!(!debug.contains("qm-token"));
    }

    #[test]
    fn test_validate_rejects_zero_history_limit() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("QUANTUM_MORPH__STORAGE__HISTORY_LIMIT", "0");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.validate(), Err(ValidationError::InvalidHistoryLimit));
    }
}
