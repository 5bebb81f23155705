//! Producer task: one record per cycle into the channel.

use std::sync::Arc;
use std::time::Duration;

use pipeguard_channel::Channel;
use pipeguard_flags::{FlagSet, StatusFlags};
use pipeguard_watchdog::{TaskId, WatchdogHandle};

use crate::category::EventCategory;
use crate::liveness;

/// Watchdog identity of the producer.
pub const PRODUCER_TASK: TaskId = TaskId::new("producer");

/// Outcome of one producer cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerCycle {
    /// The record was enqueued.
    Delivered(u64),
    /// The channel was full and the record was dropped.
    Dropped(u64),
}

/// Emits a monotonically increasing counter, wrapping at `u64::MAX`.
///
/// A full channel drops the record; there is no retry and no back-pressure.
#[derive(Debug)]
pub struct ProducerTask {
    channel: Arc<Channel<u64>>,
    flags: Arc<FlagSet>,
    watchdog: WatchdogHandle,
    period: Duration,
    next_value: u64,
}

impl ProducerTask {
    /// Create a producer starting at zero.
    #[must_use]
    pub fn new(
        channel: Arc<Channel<u64>>,
        flags: Arc<FlagSet>,
        watchdog: WatchdogHandle,
        period: Duration,
    ) -> Self {
        Self {
            channel,
            flags,
            watchdog,
            period,
            next_value: 0,
        }
    }

    /// Value the next cycle will try to deliver.
    #[must_use]
    pub fn next_value(&self) -> u64 {
        self.next_value
    }

    /// Run a single cycle: attempt one non-blocking send and report it.
    pub fn cycle(&mut self) -> ProducerCycle {
        let value = self.next_value;
        self.next_value = value.wrapping_add(1);

        match self.channel.try_send(value) {
            Ok(()) => {
                self.flags.set(StatusFlags::PRODUCER_OK);
                tracing::info!(
                    category = EventCategory::ProducerOk.as_str(),
                    value,
                    "record delivered"
                );
                ProducerCycle::Delivered(value)
            }
            Err(value) => {
                self.flags.set(StatusFlags::PRODUCER_FULL);
                tracing::warn!(
                    category = EventCategory::ProducerFull.as_str(),
                    value,
                    capacity = self.channel.capacity(),
                    "channel full; record dropped"
                );
                ProducerCycle::Dropped(value)
            }
        }
    }

    /// Cycle forever at the configured period, refreshing the watchdog each time.
    pub async fn run(mut self) {
        loop {
            self.cycle();
            liveness::refresh(&self.watchdog);
            tokio::time::sleep(self.period).await;
        }
    }
}
