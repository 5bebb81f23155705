//! Periodic system information logging.

use std::fmt;
use std::time::Duration;

use pipeguard_watchdog::{TaskId, WatchdogHandle};
use serde::{Deserialize, Serialize};

use crate::category::EventCategory;
use crate::liveness;

/// Watchdog identity of the system logger.
pub const LOGGER_TASK: TaskId = TaskId::new("logger");

/// Snapshot of host facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Logical CPU count.
    pub core_count: usize,
    /// Platform revision string.
    pub revision: String,
    /// Memory currently available for allocation, in bytes.
    pub free_memory_bytes: u64,
}

/// Source of [`SystemInfo`] snapshots.
pub trait SystemInfoSource: Send {
    /// Read a fresh snapshot.
    fn read_system_info(&mut self) -> SystemInfo;
}

/// Host-backed source: CPU count, OS version and available memory.
pub struct HostSystemInfo {
    system: sysinfo::System,
    revision: String,
}

impl fmt::Debug for HostSystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSystemInfo")
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl Default for HostSystemInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl HostSystemInfo {
    /// Probe the host. The OS revision is read once; memory on every call.
    #[must_use]
    pub fn new() -> Self {
        let info = os_info::get();
        Self {
            system: sysinfo::System::new(),
            revision: format!("{} {}", info.os_type(), info.version()),
        }
    }
}

impl SystemInfoSource for HostSystemInfo {
    fn read_system_info(&mut self) -> SystemInfo {
        self.system.refresh_memory();
        SystemInfo {
            core_count: num_cpus::get(),
            revision: self.revision.clone(),
            free_memory_bytes: self.system.available_memory(),
        }
    }
}

/// Logs a [`SystemInfo`] snapshot every cycle.
pub struct SystemLoggerTask {
    source: Box<dyn SystemInfoSource>,
    watchdog: WatchdogHandle,
    period: Duration,
}

impl fmt::Debug for SystemLoggerTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemLoggerTask")
            .field("watchdog", &self.watchdog)
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

impl SystemLoggerTask {
    /// Create a logger reading from `source`.
    #[must_use]
    pub fn new(
        source: Box<dyn SystemInfoSource>,
        watchdog: WatchdogHandle,
        period: Duration,
    ) -> Self {
        Self {
            source,
            watchdog,
            period,
        }
    }

    /// Read and log one snapshot.
    pub fn cycle(&mut self) -> SystemInfo {
        let info = self.source.read_system_info();
        tracing::info!(
            category = EventCategory::Logger.as_str(),
            core_count = info.core_count,
            revision = %info.revision,
            free_memory_bytes = info.free_memory_bytes,
            "system info"
        );
        info
    }

    /// Cycle forever at the configured period.
    pub async fn run(mut self) {
        loop {
            self.cycle();
            liveness::refresh(&self.watchdog);
            tokio::time::sleep(self.period).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskResult;
    use crate::test_support::{FixedSystemInfo, quiet_watchdog};

    #[test]
    fn test_cycle_reads_source() -> TaskResult<()> {
        let mut task = SystemLoggerTask::new(
            Box::new(FixedSystemInfo),
            quiet_watchdog().register(LOGGER_TASK)?,
            Duration::from_millis(3000),
        );
        let info = task.cycle();
        assert_eq!(info.core_count, 4);
        assert_eq!(info.revision, "test-rev");
        Ok(())
    }

    #[test]
    fn test_host_source_reports_cores() {
        let mut host = HostSystemInfo::new();
        let info = host.read_system_info();
        assert!(info.core_count >= 1);
        assert!(!info.revision.is_empty());
    }
}
