//! Supervisor task: drains status flags and reports them.

use std::time::Duration;

use pipeguard_flags::{FlagDrain, StatusFlags};
use pipeguard_watchdog::{TaskId, WatchdogHandle};

use crate::category::EventCategory;
use crate::liveness;

/// Watchdog identity of the supervisor.
pub const SUPERVISOR_TASK: TaskId = TaskId::new("supervisor");

/// Sole reader of the flag set.
///
/// Each cycle takes every set bit with a clear-on-read drain and emits one
/// log line per bit. Escalation bits are logged at `warn`, the rest at
/// `info`. An empty drain produces no output.
#[derive(Debug)]
pub struct SupervisorTask {
    reader: FlagDrain,
    watchdog: WatchdogHandle,
    period: Duration,
}

impl SupervisorTask {
    /// Create a supervisor owning the flag set's reader claim.
    #[must_use]
    pub fn new(reader: FlagDrain, watchdog: WatchdogHandle, period: Duration) -> Self {
        Self {
            reader,
            watchdog,
            period,
        }
    }

    /// Drain and report. Returns the bits observed this cycle.
    pub fn cycle(&mut self) -> StatusFlags {
        let observed = self.reader.drain_all();
        for flag in observed.iter() {
            let Some((category, message)) = EventCategory::supervisor_event(flag) else {
                continue;
            };
            if flag.is_escalation() {
                tracing::warn!(category = category.as_str(), "{message}");
            } else {
                tracing::info!(category = category.as_str(), "{message}");
            }
        }
        observed
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
    use crate::test_support::quiet_watchdog;
    use pipeguard_flags::FlagSet;
    use std::sync::Arc;

    fn supervisor(flags: &Arc<FlagSet>) -> TaskResult<SupervisorTask> {
        Ok(SupervisorTask::new(
            flags.claim_reader()?,
            quiet_watchdog().register(SUPERVISOR_TASK)?,
            Duration::from_millis(2000),
        ))
    }

    #[test]
    fn test_cycle_drains_everything_once() -> TaskResult<()> {
        let flags = Arc::new(FlagSet::new());
        let mut task = supervisor(&flags)?;
        flags.set(StatusFlags::PRODUCER_OK | StatusFlags::CONSUMER_TIMEOUT);

        assert_eq!(
            task.cycle(),
            StatusFlags::PRODUCER_OK | StatusFlags::CONSUMER_TIMEOUT
        );
        assert_eq!(flags.snapshot(), StatusFlags::empty());
        assert_eq!(task.cycle(), StatusFlags::empty());
        Ok(())
    }

    #[test]
    fn test_owns_reader_claim() -> TaskResult<()> {
        let flags = Arc::new(FlagSet::new());
        let task = supervisor(&flags)?;
        assert!(flags.has_reader());
        assert!(matches!(
            flags.claim_reader(),
            Err(pipeguard_flags::FlagError::ReaderAlreadyClaimed)
        ));
        drop(task);
        assert!(!flags.has_reader());
        Ok(())
    }

    #[test]
    fn test_every_flag_has_its_own_message() {
        let messages: std::collections::HashSet<_> = StatusFlags::all()
            .iter()
            .filter_map(EventCategory::supervisor_event)
            .map(|(_, message)| message)
            .collect();
        assert_eq!(messages.len(), StatusFlags::all().iter().count());
    }
}
