//! Configuration management for the wizard.
//!
//! Loads configuration from environment variables with sensible defaults.

use event_wizard_core::draft::PLACEHOLDER_NAME;
use event_wizard_runtime::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Wizard configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    /// `PostgreSQL` configuration
    pub database: DatabaseConfig,
    /// Draft save behaviour
    pub save: SaveConfig,
    /// Log filter (`WIZARD_LOG_LEVEL`) used when `RUST_LOG` is unset or invalid
    pub log_level: String,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL; the in-memory store is used when absent
    pub url: Option<String>,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
}

/// Draft save configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveConfig {
    /// Attempts per save before giving up on a missing owner record
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds
    pub retry_delay_ms: u64,
    /// Name persisted when the user has not entered one
    pub placeholder_name: String,
}

impl WizardConfig {
    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use event_wizard::config::WizardConfig;
    ///
    /// let config = WizardConfig::from_lookup(|key| {
    ///     (key == "DRAFT_SAVE_MAX_ATTEMPTS").then(|| "5".to_string())
    /// });
    /// assert_eq!(config.save.max_attempts, 5);
    /// assert_eq!(config.database.url, None);
    /// ```
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
                max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
                connect_timeout: lookup("DATABASE_CONNECT_TIMEOUT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            save: SaveConfig {
                max_attempts: lookup("DRAFT_SAVE_MAX_ATTEMPTS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3),
                retry_delay_ms: lookup("DRAFT_SAVE_RETRY_DELAY_MS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(50),
                placeholder_name: lookup("DRAFT_PLACEHOLDER_NAME")
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| PLACEHOLDER_NAME.to_string()),
            },
            log_level: lookup("WIZARD_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Retry policy for draft saves.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_attempts(self.save.max_attempts)
            .initial_delay(Duration::from_millis(self.save.retry_delay_ms))
            .build()
    }

    /// Pool connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.database.connect_timeout)
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
