//! Consumer task: drains the channel and escalates on starvation.

use std::sync::Arc;
use std::time::Duration;

use pipeguard_channel::Channel;
use pipeguard_flags::{FlagSet, StatusFlags};
use pipeguard_watchdog::{FatalFault, FaultHandler, TaskId, WatchdogHandle};

use crate::category::EventCategory;
use crate::config::{EscalationConfig, PipelineConfig};
use crate::escalation::{EscalationAction, EscalationLevel, Miss, MissTracker};
use crate::liveness;
use crate::scratch::ScratchPool;

/// Watchdog identity of the consumer.
pub const CONSUMER_TASK: TaskId = TaskId::new("consumer");

/// Outcome of one consumer cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerCycle {
    /// A record was received; the miss counter is back at zero.
    Received(u64),
    /// The channel was empty.
    Missed {
        /// Consecutive misses including this one.
        misses: u32,
        /// Recovery action taken on this miss.
        action: Option<EscalationAction>,
    },
    /// No scratch slot was available; the channel was not touched.
    AllocationFailed,
}

impl ConsumerCycle {
    /// Whether this cycle requested a full restart.
    #[must_use]
    pub fn is_restart(&self) -> bool {
        matches!(
            self,
            Self::Missed {
                action: Some(EscalationAction::Restart),
                ..
            }
        )
    }
}

/// Timing knobs for the consumer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerTiming {
    /// Delay between cycles.
    pub period: Duration,
    /// Delay after a failed scratch allocation.
    pub alloc_backoff: Duration,
    /// Delay between the restart flag and the fatal fault.
    pub restart_grace: Duration,
}

impl ConsumerTiming {
    /// Timing taken from a pipeline configuration.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            period: config.consumer_period(),
            alloc_backoff: config.alloc_backoff(),
            restart_grace: config.restart_grace(),
        }
    }
}

/// Receives one record per cycle and runs staged starvation recovery.
pub struct ConsumerTask {
    channel: Arc<Channel<u64>>,
    flags: Arc<FlagSet>,
    scratch: Arc<ScratchPool>,
    tracker: MissTracker,
    watchdog: WatchdogHandle,
    fault_handler: Arc<dyn FaultHandler>,
    timing: ConsumerTiming,
}

impl std::fmt::Debug for ConsumerTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerTask")
            .field("misses", &self.tracker.misses())
            .field("level", &self.tracker.level())
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

impl ConsumerTask {
    /// Create a consumer.
    #[must_use]
    pub fn new(
        channel: Arc<Channel<u64>>,
        flags: Arc<FlagSet>,
        scratch: Arc<ScratchPool>,
        escalation: EscalationConfig,
        watchdog: WatchdogHandle,
        fault_handler: Arc<dyn FaultHandler>,
        timing: ConsumerTiming,
    ) -> Self {
        Self {
            channel,
            flags,
            scratch,
            tracker: MissTracker::new(escalation),
            watchdog,
            fault_handler,
            timing,
        }
    }

    /// Consecutive misses so far.
    #[must_use]
    pub fn misses(&self) -> u32 {
        self.tracker.misses()
    }

    /// Current escalation level.
    #[must_use]
    pub fn level(&self) -> EscalationLevel {
        self.tracker.level()
    }

    /// Run a single cycle.
    ///
    /// The scratch slot is returned to the pool before this returns, whatever
    /// the outcome. A failed allocation leaves the miss counter untouched.
    pub fn cycle(&mut self) -> ConsumerCycle {
        let Some(mut slot) = self.scratch.try_acquire() else {
            tracing::warn!(
                category = EventCategory::AllocError.as_str(),
                slots = self.scratch.slots(),
                "no scratch slot available; backing off"
            );
            return ConsumerCycle::AllocationFailed;
        };

        if let Some(value) = self.channel.try_receive() {
            slot.store(value);
            let cleared = self.tracker.record_success();
            self.flags.set(StatusFlags::CONSUMER_OK);
            tracing::info!(
                category = EventCategory::ConsumerOk.as_str(),
                value = slot.get(),
                cleared_misses = cleared,
                "record received"
            );
            return ConsumerCycle::Received(value);
        }

        let Miss {
            count: misses,
            action,
        } = self.tracker.record_miss();
        let level = self.tracker.level().as_str();
        match action {
            Some(EscalationAction::Warn) => {
                self.flags.set(StatusFlags::CONSUMER_TIMEOUT);
                tracing::warn!(
                    category = EventCategory::ConsumerTimeout.as_str(),
                    misses,
                    level,
                    "channel empty past soft timeout"
                );
            }
            Some(EscalationAction::FlushChannel) => {
                let discarded = self.channel.reset();
                self.flags.set(StatusFlags::CONSUMER_RESET);
                tracing::warn!(
                    category = EventCategory::ConsumerReset.as_str(),
                    misses,
                    level,
                    discarded,
                    "channel flushed"
                );
            }
            Some(EscalationAction::Restart) => {
                self.flags.set(StatusFlags::CONSUMER_RESTART);
                tracing::error!(
                    category = EventCategory::ConsumerRestart.as_str(),
                    misses,
                    level,
                    "starvation limit reached; requesting restart"
                );
            }
            None => {
                tracing::trace!(misses, "channel empty");
            }
        }
        ConsumerCycle::Missed { misses, action }
    }

    /// Cycle until a restart is requested.
    ///
    /// On a failed allocation the watchdog is refreshed before the back-off,
    /// so a persistently exhausted pool never looks like a hung task. On a
    /// restart the loop waits the grace delay, hands the fault to the fault
    /// handler and returns without cycling again.
    pub async fn run(mut self) {
        loop {
            match self.cycle() {
                ConsumerCycle::AllocationFailed => {
                    liveness::refresh(&self.watchdog);
                    tokio::time::sleep(self.timing.alloc_backoff).await;
                    continue;
                }
                ConsumerCycle::Missed {
                    misses,
                    action: Some(EscalationAction::Restart),
                } => {
                    tokio::time::sleep(self.timing.restart_grace).await;
                    self.fault_handler.on_fatal(&FatalFault::MissLimit {
                        task: CONSUMER_TASK,
                        misses,
                    });
                    return;
                }
                ConsumerCycle::Received(_) | ConsumerCycle::Missed { .. } => {}
            }
            liveness::refresh(&self.watchdog);
            tokio::time::sleep(self.timing.period).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskResult;
    use crate::test_support::quiet_watchdog;

    struct Fixture {
        consumer: ConsumerTask,
        channel: Arc<Channel<u64>>,
        flags: Arc<FlagSet>,
        scratch: Arc<ScratchPool>,
    }

    fn fixture(capacity: usize, slots: usize) -> TaskResult<Fixture> {
        let config = PipelineConfig::default();
        let channel = Arc::new(Channel::with_capacity(capacity)?);
        let flags = Arc::new(FlagSet::new());
        let scratch = ScratchPool::with_slots(slots);
        let consumer = ConsumerTask::new(
            Arc::clone(&channel),
            Arc::clone(&flags),
            Arc::clone(&scratch),
            config.escalation,
            quiet_watchdog().register(CONSUMER_TASK)?,
            Arc::new(|_: &FatalFault| {}),
            ConsumerTiming::from_config(&config),
        );
        Ok(Fixture {
            consumer,
            channel,
            flags,
            scratch,
        })
    }

    #[test]
    fn test_receive_sets_ok_and_frees_slot() -> TaskResult<()> {
        let mut f = fixture(4, 1)?;
        assert_eq!(f.channel.try_send(7), Ok(()));
        assert_eq!(f.consumer.cycle(), ConsumerCycle::Received(7));
        assert_eq!(f.flags.snapshot(), StatusFlags::CONSUMER_OK);
        assert_eq!(f.scratch.available(), 1);
        Ok(())
    }

    #[test]
    fn test_miss_increments_counter() -> TaskResult<()> {
        let mut f = fixture(4, 1)?;
        assert_eq!(
            f.consumer.cycle(),
            ConsumerCycle::Missed {
                misses: 1,
                action: None
            }
        );
        assert_eq!(f.flags.snapshot(), StatusFlags::empty());
        assert_eq!(f.scratch.available(), 1);
        Ok(())
    }

    #[test]
    fn test_receive_after_misses_resets_counter() -> TaskResult<()> {
        let mut f = fixture(4, 1)?;
        for _ in 0..12 {
            f.consumer.cycle();
        }
        assert_eq!(f.consumer.level(), EscalationLevel::Warned);
        assert_eq!(f.channel.try_send(1), Ok(()));
        f.consumer.cycle();
        assert_eq!(f.consumer.misses(), 0);
        assert_eq!(f.consumer.level(), EscalationLevel::Normal);
        Ok(())
    }

    #[test]
    fn test_allocation_failure_leaves_channel_and_counter() -> TaskResult<()> {
        let mut f = fixture(4, 1)?;
        assert_eq!(f.channel.try_send(3), Ok(()));
        let held = f.scratch.try_acquire();
        assert!(held.is_some());

        assert_eq!(f.consumer.cycle(), ConsumerCycle::AllocationFailed);
        assert_eq!(f.channel.len(), 1);
        assert_eq!(f.consumer.misses(), 0);

        drop(held);
        assert_eq!(f.consumer.cycle(), ConsumerCycle::Received(3));
        Ok(())
    }

    #[test]
    fn test_flush_discards_channel_contents() -> TaskResult<()> {
        let mut f = fixture(4, 1)?;
        for _ in 0..19 {
            f.consumer.cycle();
        }
        assert_eq!(f.channel.stats().resets, 0);
        let outcome = f.consumer.cycle();
        assert_eq!(
            outcome,
            ConsumerCycle::Missed {
                misses: 20,
                action: Some(EscalationAction::FlushChannel)
            }
        );
        assert_eq!(f.channel.stats().resets, 1);
        assert!(f.flags.snapshot().contains(StatusFlags::CONSUMER_RESET));
        Ok(())
    }

    #[test]
    fn test_flush_reports_triggering_count_when_counter_resets() -> TaskResult<()> {
        let config = PipelineConfig::default();
        let channel = Arc::new(Channel::with_capacity(4)?);
        let mut consumer = ConsumerTask::new(
            Arc::clone(&channel),
            Arc::new(FlagSet::new()),
            ScratchPool::with_slots(1),
            EscalationConfig {
                reset_after_flush: true,
                ..config.escalation
            },
            quiet_watchdog().register(CONSUMER_TASK)?,
            Arc::new(|_: &FatalFault| {}),
            ConsumerTiming::from_config(&config),
        );
        for _ in 0..19 {
            consumer.cycle();
        }
        assert_eq!(
            consumer.cycle(),
            ConsumerCycle::Missed {
                misses: 20,
                action: Some(EscalationAction::FlushChannel)
            }
        );
        assert_eq!(consumer.misses(), 0);
        assert_eq!(channel.stats().resets, 1);
        Ok(())
    }
}
