//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use pipeguard_watchdog::WatchdogConfig;

use crate::error::{TaskError, TaskResult};

/// Consecutive-miss thresholds for consumer starvation recovery.
///
/// Each action fires when the miss counter *equals* its threshold, never on a
/// range, so every action happens at most once per climb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Misses before the soft-timeout warning. Default: 10.
    pub warn_at: u32,
    /// Misses before the channel is flushed. Default: 20.
    pub flush_at: u32,
    /// Misses before a full system restart is requested. Default: 30.
    pub restart_at: u32,
    /// Start counting from zero again after the flush.
    ///
    /// With `true` a sustained stall flushes every `flush_at` misses and
    /// never reaches `restart_at`. Default: `false`.
    ///
    /// `false` reproduces the single-slot deployment, where the counter keeps
    /// climbing after the flush and the 30th miss restarts. `true` reproduces
    /// the ten-slot deployment, which zeroes the counter right after flushing.
    pub reset_after_flush: bool,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            warn_at: 10,
            flush_at: 20,
            restart_at: 30,
            reset_after_flush: false,
        }
    }
}

impl EscalationConfig {
    /// Validate the thresholds.
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 < warn_at < flush_at < restart_at`.
    pub fn validate(&self) -> TaskResult<()> {
        if self.warn_at == 0 {
            return Err(TaskError::invalid_configuration("escalation.warn_at must be > 0"));
        }
        if self.flush_at <= self.warn_at {
            return Err(TaskError::invalid_configuration(
                "escalation.flush_at must be greater than escalation.warn_at",
            ));
        }
        if self.restart_at <= self.flush_at {
            return Err(TaskError::invalid_configuration(
                "escalation.restart_at must be greater than escalation.flush_at",
            ));
        }
        Ok(())
    }
}

/// Complete pipeline configuration.
///
/// Every field has a default, so an empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Identity tag attached to every log line.
    pub node_id: String,
    /// Channel slot count. Default: 10.
    pub channel_capacity: usize,
    /// Producer cycle period in milliseconds. Default: 1000.
    pub producer_period_ms: u32,
    /// Consumer cycle period in milliseconds. Default: 500.
    pub consumer_period_ms: u32,
    /// Supervisor cycle period in milliseconds. Default: 2000.
    pub supervisor_period_ms: u32,
    /// System logger cycle period in milliseconds. Default: 3000.
    pub logger_period_ms: u32,
    /// Consumer back-off after a scratch allocation failure. Default: 100.
    pub alloc_backoff_ms: u32,
    /// Delay between the restart flag and the fatal fault, so the supervisor
    /// and log sink can observe it. Default: 100.
    pub restart_grace_ms: u32,
    /// Scratch slots available to the consumer. Default: 4.
    pub scratch_slots: usize,
    /// Starvation thresholds.
    pub escalation: EscalationConfig,
    /// Liveness monitor settings.
    pub watchdog: WatchdogConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            node_id: "pipeguard".to_string(),
            channel_capacity: 10,
            producer_period_ms: 1000,
            consumer_period_ms: 500,
            supervisor_period_ms: 2000,
            logger_period_ms: 3000,
            alloc_backoff_ms: 100,
            restart_grace_ms: 100,
            scratch_slots: 4,
            escalation: EscalationConfig::default(),
            watchdog: WatchdogConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// Every task period and back-off must stay below the watchdog deadline,
    /// otherwise a healthy task would be reported as stalled.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> TaskResult<()> {
        if self.node_id.trim().is_empty() {
            return Err(TaskError::invalid_configuration("node_id must not be empty"));
        }
        if self.channel_capacity == 0 {
            return Err(TaskError::invalid_configuration("channel_capacity must be > 0"));
        }
        if self.scratch_slots == 0 {
            return Err(TaskError::invalid_configuration("scratch_slots must be > 0"));
        }
        self.escalation.validate()?;
        self.watchdog.validate()?;

        let timeout_ms = self.watchdog.timeout_ms;
        for (name, value) in self.periods() {
            if value == 0 {
                return Err(TaskError::invalid_configuration(format!("{name} must be > 0")));
            }
            if value >= timeout_ms {
                return Err(TaskError::invalid_configuration(format!(
                    "{name} ({value}ms) must be below watchdog.timeout_ms ({timeout_ms}ms)"
                )));
            }
        }
        Ok(())
    }

    fn periods(&self) -> [(&'static str, u32); 6] {
        [
            ("producer_period_ms", self.producer_period_ms),
            ("consumer_period_ms", self.consumer_period_ms),
            ("supervisor_period_ms", self.supervisor_period_ms),
            ("logger_period_ms", self.logger_period_ms),
            ("alloc_backoff_ms", self.alloc_backoff_ms),
            ("restart_grace_ms", self.restart_grace_ms),
        ]
    }

    /// Producer period as a [`Duration`].
    #[must_use]
    pub fn producer_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.producer_period_ms))
    }

    /// Consumer period as a [`Duration`].
    #[must_use]
    pub fn consumer_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.consumer_period_ms))
    }

    /// Supervisor period as a [`Duration`].
    #[must_use]
    pub fn supervisor_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.supervisor_period_ms))
    }

    /// System logger period as a [`Duration`].
    #[must_use]
    pub fn logger_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.logger_period_ms))
    }

    /// Allocation back-off as a [`Duration`].
    #[must_use]
    pub fn alloc_backoff(&self) -> Duration {
        Duration::from_millis(u64::from(self.alloc_backoff_ms))
    }

    /// Restart grace delay as a [`Duration`].
    #[must_use]
    pub fn restart_grace(&self) -> Duration {
        Duration::from_millis(u64::from(self.restart_grace_ms))
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the node identity tag.
    #[must_use]
    pub fn node_id(mut self, node_id: impl Into<String>) -> Self {
        self.config.node_id = node_id.into();
        self
    }

    /// Set the channel capacity.
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// Set the producer period.
    #[must_use]
    pub fn producer_period_ms(mut self, ms: u32) -> Self {
        self.config.producer_period_ms = ms;
        self
    }

    /// Set the consumer period.
    #[must_use]
    pub fn consumer_period_ms(mut self, ms: u32) -> Self {
        self.config.consumer_period_ms = ms;
        self
    }

    /// Set the supervisor period.
    #[must_use]
    pub fn supervisor_period_ms(mut self, ms: u32) -> Self {
        self.config.supervisor_period_ms = ms;
        self
    }

    /// Set the system logger period.
    #[must_use]
    pub fn logger_period_ms(mut self, ms: u32) -> Self {
        self.config.logger_period_ms = ms;
        self
    }

    /// Set the allocation back-off.
    #[must_use]
    pub fn alloc_backoff_ms(mut self, ms: u32) -> Self {
        self.config.alloc_backoff_ms = ms;
        self
    }

    /// Set the restart grace delay.
    #[must_use]
    pub fn restart_grace_ms(mut self, ms: u32) -> Self {
        self.config.restart_grace_ms = ms;
        self
    }

    /// Set the scratch slot count.
    #[must_use]
    pub fn scratch_slots(mut self, slots: usize) -> Self {
        self.config.scratch_slots = slots;
        self
    }

    /// Set the escalation thresholds.
    #[must_use]
    pub fn escalation(mut self, escalation: EscalationConfig) -> Self {
        self.config.escalation = escalation;
        self
    }

    /// Set the watchdog configuration.
    #[must_use]
    pub fn watchdog(mut self, watchdog: WatchdogConfig) -> Self {
        self.config.watchdog = watchdog;
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> TaskResult<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() -> TaskResult<()> {
        let config = PipelineConfig::default();
        config.validate()?;
        assert_eq!(config.channel_capacity, 10);
        assert_eq!(config.consumer_period(), Duration::from_millis(500));
        assert_eq!(config.escalation.restart_at, 30);
        assert!(!config.escalation.reset_after_flush);
        Ok(())
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = PipelineConfig::builder().channel_capacity(0).build();
        assert!(matches!(result, Err(TaskError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_period_must_stay_below_watchdog_timeout() {
        let result = PipelineConfig::builder().logger_period_ms(5000).build();
        let Err(TaskError::InvalidConfiguration(reason)) = result else {
            panic!("expected an invalid configuration");
        };
        assert!(reason.contains("logger_period_ms"));
    }

    #[test]
    fn test_zero_period_rejected() {
        let result = PipelineConfig::builder().producer_period_ms(0).build();
        assert!(matches!(result, Err(TaskError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_thresholds_must_increase() {
        let escalation = EscalationConfig {
            warn_at: 10,
            flush_at: 10,
            ..EscalationConfig::default()
        };
        assert!(matches!(
            escalation.validate(),
            Err(TaskError::InvalidConfiguration(_))
        ));

        let escalation = EscalationConfig {
            warn_at: 0,
            ..EscalationConfig::default()
        };
        assert!(matches!(
            escalation.validate(),
            Err(TaskError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_invalid_watchdog_is_reported() {
        let config = PipelineConfig {
            watchdog: WatchdogConfig {
                timeout_ms: 5000,
                check_interval_ms: 0,
            },
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(TaskError::Watchdog(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<(), serde_json::Error> {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"channel_capacity": 1, "escalation": {"warn_at": 5}}"#)?;
        assert_eq!(config.channel_capacity, 1);
        assert_eq!(config.escalation.warn_at, 5);
        assert_eq!(config.escalation.flush_at, 20);
        assert_eq!(config.producer_period_ms, 1000);
        assert_eq!(config.node_id, "pipeguard");
        Ok(())
    }
}
