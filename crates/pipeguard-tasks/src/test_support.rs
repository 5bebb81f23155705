//! Fixtures shared by the in-crate unit tests.

use std::sync::Arc;

use pipeguard_watchdog::{FatalFault, TaskWatchdog, WatchdogConfig};

use crate::sysmon::{SystemInfo, SystemInfoSource};

/// A disarmed watchdog whose fault handler does nothing.
pub(crate) fn quiet_watchdog() -> Arc<TaskWatchdog> {
    Arc::new(TaskWatchdog::new(
        WatchdogConfig::default(),
        Arc::new(|_: &FatalFault| {}),
    ))
}

/// System info source with fixed values.
#[derive(Debug)]
pub(crate) struct FixedSystemInfo;

impl SystemInfoSource for FixedSystemInfo {
    fn read_system_info(&mut self) -> SystemInfo {
        SystemInfo {
            core_count: 4,
            revision: "test-rev".to_string(),
            free_memory_bytes: 1 << 20,
        }
    }
}
