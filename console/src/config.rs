//! Console configuration
//!
//! Defaults suit a gopypi server on the local machine. Every field can be set
//! with a builder method or read from the environment by
//! [`ConsoleConfig::from_env`].

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Base URL variable
pub const ENV_URL: &str = "GOPYPI_ADMIN_URL";
/// Token file variable; unset keeps the token in memory only
pub const ENV_TOKEN_FILE: &str = "GOPYPI_ADMIN_TOKEN_FILE";
/// Flash message lifetime in milliseconds
pub const ENV_FLASH_TTL_MS: &str = "GOPYPI_ADMIN_FLASH_TTL_MS";
/// `true`/`false`: post a message when a listing fails to load
pub const ENV_REPORT_LIST_FAILURES: &str = "GOPYPI_ADMIN_REPORT_LIST_FAILURES";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be used
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        /// Variable name
        var: &'static str,
        /// Value found
        value: String,
        /// What was wrong with it
        reason: &'static str,
    },
}

/// Console configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// API root, e.g. `http://localhost:9900/api`
    ///
    /// Default: `http://localhost:9900/api`
    pub base_url: String,

    /// File the session token is kept in; `None` keeps it in memory
    pub token_path: Option<PathBuf>,

    /// How long a flash message stays visible
    ///
    /// Default: 5 seconds
    pub flash_ttl: Duration,

    /// Post a danger message when a listing fails to load
    ///
    /// Default: false (listing failures are only logged)
    pub report_list_failures: bool,
}

impl ConsoleConfig {
    /// Configuration for the server at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Keep the session token in `path`
    #[must_use]
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = Some(path.into());
        self
    }

    /// Set flash message lifetime
    #[must_use]
    pub const fn with_flash_ttl(mut self, ttl: Duration) -> Self {
        self.flash_ttl = ttl;
        self
    }

    /// Post messages for listing failures too
    #[must_use]
    pub const fn with_report_list_failures(mut self, report: bool) -> Self {
        self.report_list_failures = report;
        self
    }

    /// Read configuration from the process environment
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to something
    /// unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`ConsoleConfig::from_env`], reading variables through `lookup`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to something
    /// unusable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_URL) {
            if url.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    var: ENV_URL,
                    value: url,
                    reason: "must not be empty",
                });
            }
            config.base_url = url.trim().to_string();
        }

        if let Some(path) = lookup(ENV_TOKEN_FILE).filter(|p| !p.is_empty()) {
            config.token_path = Some(PathBuf::from(path));
        }

        if let Some(ttl) = lookup(ENV_FLASH_TTL_MS) {
            let millis = ttl.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: ENV_FLASH_TTL_MS,
                value: ttl.clone(),
                reason: "expected milliseconds",
            })?;
            config.flash_ttl = Duration::from_millis(millis);
        }

        if let Some(flag) = lookup(ENV_REPORT_LIST_FAILURES) {
            config.report_list_failures = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: ENV_REPORT_LIST_FAILURES,
                        value: flag,
                        reason: "expected true or false",
                    });
                },
            };
        }

        Ok(config)
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9900/api".to_string(),
            token_path: None,
            flash_ttl: Duration::from_millis(5000),
            report_list_failures: false,
        }
    }
}
