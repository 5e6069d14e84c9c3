//! Process-wide configuration.
//!
//! Configuration is a plain value. Most applications never touch it; the
//! defaults match the behavior documented on each operation. Applications
//! that want a different default dispatch target or different retry
//! defaults install a [`Config`] once at startup:
//!
//! ```rust,ignore
//! use promises::{Config, ConcurrentQueue, Target, config};
//! use std::time::Duration;
//!
//! config::init(
//!     Config::new()
//!         .with_default_target(Target::new(ConcurrentQueue::default()))
//!         .with_retry_attempts(3)
//!         .with_retry_delay(Duration::from_millis(250)),
//! )
//! .expect("configuration installed twice");
//! ```
//!
//! The first read of the configuration freezes it: calling [`init`] after any
//! promise has used a default returns [`ConfigError::AlreadyInitialized`].

use std::sync::OnceLock;
use std::time::Duration;

use thiserror::Error;

use crate::dispatch::Target;

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Default number of retries performed by [`retry`](crate::retry()).
pub const DEFAULT_RETRY_ATTEMPTS: usize = 1;

/// Default pause between retry attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Errors returned by [`init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A configuration was already installed, or the defaults were already
    /// read and frozen.
    #[error("promise configuration is already initialized")]
    AlreadyInitialized,
}

/// Library-wide defaults.
///
/// With the `serde` feature the scalar settings can be deserialized; the
/// default target is runtime state and is always skipped.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    #[cfg_attr(feature = "serde", serde(skip))]
    default_target: Option<Target>,
    retry_attempts: usize,
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    retry_delay: Duration,
}

impl Config {
    /// Creates a configuration holding the library defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default_target: None,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Sets the target used when no target is given explicitly.
    #[must_use]
    pub fn with_default_target(mut self, target: Target) -> Self {
        self.default_target = Some(target);
        self
    }

    /// Sets the default number of retries after the first attempt.
    #[must_use]
    pub fn with_retry_attempts(mut self, attempts: usize) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Sets the default pause between retry attempts.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// The configured default target, if one was set.
    #[must_use]
    pub const fn default_target(&self) -> Option<&Target> {
        self.default_target.as_ref()
    }

    /// Default number of retries after the first attempt.
    #[must_use]
    pub const fn retry_attempts(&self) -> usize {
        self.retry_attempts
    }

    /// Default pause between retry attempts.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs the process-wide configuration.
///
/// # Errors
///
/// Returns [`ConfigError::AlreadyInitialized`] if a configuration was
/// installed before, or if [`current`] has already been called.
pub fn init(config: Config) -> Result<(), ConfigError> {
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    tracing::debug!("promise configuration installed");
    Ok(())
}

/// Returns the process-wide configuration, freezing the defaults if none was
/// installed.
pub fn current() -> &'static Config {
    CONFIG.get_or_init(Config::new)
}

#[cfg(feature = "serde")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn new_config_holds_defaults() {
        let config = Config::new();
        assert!(config.default_target().is_none());
        assert_eq!(config.retry_attempts(), DEFAULT_RETRY_ATTEMPTS);
        assert_eq!(config.retry_delay(), DEFAULT_RETRY_DELAY);
    }

    #[rstest]
    fn builder_overrides_fields() {
        let config = Config::new()
            .with_default_target(Target::inline())
            .with_retry_attempts(5)
            .with_retry_delay(Duration::from_millis(10));

        assert!(config.default_target().unwrap().ptr_eq(&Target::inline()));
        assert_eq!(config.retry_attempts(), 5);
        assert_eq!(config.retry_delay(), Duration::from_millis(10));
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn config_deserializes_scalar_settings() {
        let config: Config =
            serde_json::from_str(r#"{ "retry_attempts": 4, "retry_delay": 250 }"#).unwrap();

        assert_eq!(config.retry_attempts(), 4);
        assert_eq!(config.retry_delay(), Duration::from_millis(250));
        assert!(config.default_target().is_none());
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn config_deserialization_fills_missing_fields() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.retry_attempts(), DEFAULT_RETRY_ATTEMPTS);
    }
}
