//! Configuration types for the task watchdog.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{WatchdogError, WatchdogResult};

/// Smallest accepted deadline in milliseconds.
pub const MIN_TIMEOUT_MS: u32 = 10;
/// Largest accepted deadline in milliseconds.
pub const MAX_TIMEOUT_MS: u32 = 60_000;

/// Task watchdog configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Liveness deadline shared by every registered task, in milliseconds.
    ///
    /// Default: 5000ms.
    pub timeout_ms: u32,

    /// How often the monitor samples registrations, in milliseconds.
    ///
    /// A breach is detected at most this long after the deadline passes.
    pub check_interval_ms: u32,
}

impl WatchdogConfig {
    /// Create a new configuration with the specified deadline.
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout_ms` is outside `10..=60000`.
    pub fn new(timeout_ms: u32) -> WatchdogResult<Self> {
        let config = Self {
            timeout_ms,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> WatchdogConfigBuilder {
        WatchdogConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> WatchdogResult<()> {
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(WatchdogError::invalid_configuration(format!(
                "timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.check_interval_ms == 0 {
            return Err(WatchdogError::invalid_configuration(
                "check_interval_ms must be greater than 0",
            ));
        }
        if self.check_interval_ms >= self.timeout_ms {
            return Err(WatchdogError::invalid_configuration(
                "check_interval_ms must be below timeout_ms",
            ));
        }
        Ok(())
    }

    /// The deadline as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout_ms))
    }

    /// The sampling period as a `Duration`.
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.check_interval_ms))
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            check_interval_ms: 100,
        }
    }
}

/// Builder for `WatchdogConfig`.
#[derive(Debug, Default)]
pub struct WatchdogConfigBuilder {
    config: WatchdogConfig,
}

impl WatchdogConfigBuilder {
    /// Set the deadline in milliseconds.
    #[must_use]
    pub fn timeout_ms(mut self, ms: u32) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Set the sampling period in milliseconds.
    #[must_use]
    pub fn check_interval_ms(mut self, ms: u32) -> Self {
        self.config.check_interval_ms = ms;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> WatchdogResult<WatchdogConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
