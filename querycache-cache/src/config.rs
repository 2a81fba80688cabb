//! Cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use querycache_core::constants::{
    DEFAULT_CACHE_TIMEOUT_SECONDS, DEFAULT_KEY_SEPARATOR, ENV_DEFAULT_TIMEOUT, ENV_KEY_NAMED_ARGS,
    ENV_KEY_SEPARATOR,
};
use querycache_core::error::{QueryCacheError, Result};

/// Cache configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL in seconds for queries registered with the configured default
    pub default_timeout_seconds: u64,
    /// Separator between the type name and each argument in a cache key
    pub key_separator: String,
    /// Whether named arguments participate in cache keys
    pub key_named_args: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_timeout_seconds: DEFAULT_CACHE_TIMEOUT_SECONDS,
            key_separator: DEFAULT_KEY_SEPARATOR.to_string(),
            key_named_args: false,
        }
    }
}

impl CacheConfig {
    /// Reads configuration from the environment, using defaults for anything
    /// unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let default_timeout_seconds = match std::env::var(ENV_DEFAULT_TIMEOUT) {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(var = ENV_DEFAULT_TIMEOUT, value = %raw, "Ignoring unparseable timeout");
                defaults.default_timeout_seconds
            }),
            Err(_) => defaults.default_timeout_seconds,
        };

        Self {
            default_timeout_seconds,
            key_separator: std::env::var(ENV_KEY_SEPARATOR).unwrap_or(defaults.key_separator),
            key_named_args: std::env::var(ENV_KEY_NAMED_ARGS)
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.key_named_args),
        }
    }

    /// Sets the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the timeout is zero or not a whole number of
    /// seconds.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() || timeout.subsec_nanos() != 0 {
            return Err(QueryCacheError::ConfigError(format!(
                "default timeout must be a positive whole number of seconds, got {timeout:?}"
            )));
        }
        self.default_timeout_seconds = timeout.as_secs();
        Ok(self)
    }

    /// Includes named arguments in cache keys.
    pub fn with_named_args_in_key(mut self) -> Self {
        self.key_named_args = true;
        self
    }

    /// Returns the default timeout as a duration.
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_seconds)
    }

    /// Checks the configuration for values the cache cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.default_timeout_seconds == 0 {
            return Err(QueryCacheError::ConfigError(
                "default timeout must be greater than zero".into(),
            ));
        }
        if self.key_separator.is_empty() {
            return Err(QueryCacheError::ConfigError(
                "key separator cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.default_timeout(), Duration::from_secs(300));
        assert_eq!(config.key_separator, ".");
        assert!(!config.key_named_args);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = CacheConfig {
            default_timeout_seconds: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(QueryCacheError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_empty_separator() {
        let config = CacheConfig {
            key_separator: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = CacheConfig::default()
            .with_default_timeout(Duration::from_secs(30))
            .unwrap()
            .with_named_args_in_key();
        assert_eq!(config.default_timeout_seconds, 30);
        assert!(config.key_named_args);
    }

    #[test]
    fn test_default_timeout_rejects_partial_seconds() {
        for timeout in [Duration::from_millis(500), Duration::from_millis(1_500), Duration::ZERO] {
            let err = CacheConfig::default().with_default_timeout(timeout).unwrap_err();
            assert!(matches!(err, QueryCacheError::ConfigError(_)));
        }
    }

    // Every test reading or writing the QUERYCACHE_* variables lives here, so
    // parallel tests never observe them half-set.
    #[test]
    fn test_from_env() {
        let cache = crate::QueryCache::from_env().unwrap();
        assert_eq!(cache.config(), &CacheConfig::default());

        std::env::set_var(ENV_DEFAULT_TIMEOUT, "45");
        std::env::set_var(ENV_KEY_SEPARATOR, ":");
        std::env::set_var(ENV_KEY_NAMED_ARGS, "1");
        let config = CacheConfig::from_env();
        assert_eq!(config.default_timeout_seconds, 45);
        assert_eq!(config.key_separator, ":");
        assert!(config.key_named_args);

        let cache = crate::QueryCache::from_env().unwrap();
        assert_eq!(cache.config().key_separator, ":");

        std::env::set_var(ENV_DEFAULT_TIMEOUT, "soon");
        assert_eq!(CacheConfig::from_env().default_timeout_seconds, DEFAULT_CACHE_TIMEOUT_SECONDS);

        std::env::set_var(ENV_KEY_SEPARATOR, "");
        let err = crate::QueryCache::from_env().err().unwrap();
        assert!(matches!(err, QueryCacheError::ConfigError(_)));

        std::env::remove_var(ENV_DEFAULT_TIMEOUT);
        std::env::remove_var(ENV_KEY_SEPARATOR);
        std::env::remove_var(ENV_KEY_NAMED_ARGS);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CacheConfig = serde_json::from_str(r#"{"key_named_args":true}"#).unwrap();
        assert!(config.key_named_args);
        assert_eq!(config.default_timeout_seconds, DEFAULT_CACHE_TIMEOUT_SECONDS);
    }
}
