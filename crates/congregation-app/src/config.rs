//! Application configuration.
//!
//! Timing thresholds for the startup sequence and the default log filter.
//! Every field has a default, so an empty TOML document is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default delay before the slow-connection indicator appears.
pub const DEFAULT_SLOW_AFTER_MS: u64 = 3_000;

/// Default delay before the startup sequence gives up waiting.
pub const DEFAULT_GIVE_UP_AFTER_MS: u64 = 10_000;

/// Default tracing filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Milliseconds before the slow-connection indicator appears
    pub slow_after_ms: u64,
    /// Milliseconds before an unsettled startup gives up and offers a retry
    pub give_up_after_ms: u64,
    /// Tracing filter used by hosts that install a subscriber
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            slow_after_ms: DEFAULT_SLOW_AFTER_MS,
            give_up_after_ms: DEFAULT_GIVE_UP_AFTER_MS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    /// Check the timing thresholds are usable.
    ///
    /// # Validation Rules
    /// - `slow_after_ms` must be greater than 0
    /// - `give_up_after_ms` must be greater than `slow_after_ms`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slow_after_ms == 0 {
            return Err(ConfigError::Invalid(
                "slow_after_ms must be greater than 0".into(),
            ));
        }
        if self.give_up_after_ms <= self.slow_after_ms {
            return Err(ConfigError::Invalid(format!(
                "give_up_after_ms ({}) must exceed slow_after_ms ({})",
                self.give_up_after_ms, self.slow_after_ms
            )));
        }
        Ok(())
    }

    /// Delay before the slow-connection indicator.
    pub fn slow_after(&self) -> Duration {
        Duration::from_millis(self.slow_after_ms)
    }

    /// Delay before giving up on the startup sequence.
    pub fn give_up_after(&self) -> Duration {
        Duration::from_millis(self.give_up_after_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.slow_after(), Duration::from_secs(3));
        assert_eq!(config.give_up_after(), Duration::from_secs(10));
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml_str("give_up_after_ms = 5000\nlog_filter = \"debug\"").unwrap();
        assert_eq!(config.slow_after_ms, DEFAULT_SLOW_AFTER_MS);
        assert_eq!(config.give_up_after_ms, 5_000);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let err = AppConfig::from_toml_str("slow_after_ms = 5000\ngive_up_after_ms = 4000")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AppConfig::from_toml_str("slow_after_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = AppConfig::from_toml_str("slow_after_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "slow_after_ms = 1500").unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.slow_after_ms, 1_500);

        let err = AppConfig::load("/nonexistent/congregation.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
