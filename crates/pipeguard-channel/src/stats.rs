//! Lock-free channel counters.
//!
//! Counters use `Ordering::Relaxed`: they are diagnostics, eventually
//! consistent with each other, and never used for synchronization.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot returned by [`Channel::stats`](crate::Channel::stats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelStats {
    /// Records accepted by `try_send`.
    pub sent: u64,
    /// Records rejected by `try_send` because the channel was full.
    pub dropped: u64,
    /// Records handed out by `try_receive`.
    pub received: u64,
    /// Number of `reset` calls.
    pub resets: u64,
    /// Records discarded by `reset`.
    pub discarded: u64,
    /// Highest occupied count observed.
    pub high_water: u64,
}

impl ChannelStats {
    /// Records currently accounted as in flight (`sent - received - discarded`).
    #[must_use]
    pub fn in_flight(&self) -> u64 {
        self.sent
            .saturating_sub(self.received)
            .saturating_sub(self.discarded)
    }

    /// Fraction of send attempts that were rejected, in percent.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "diagnostic ratio, precision loss above 2^52 attempts is irrelevant"
    )]
    pub fn drop_rate_percent(&self) -> f64 {
        let attempts = self.sent.saturating_add(self.dropped);
        if attempts == 0 {
            return 0.0;
        }
        (self.dropped as f64 / attempts as f64) * 100.0
    }
}

#[derive(Debug, Default)]
pub(crate) struct ChannelCounters {
    sent: AtomicU64,
    dropped: AtomicU64,
    received: AtomicU64,
    resets: AtomicU64,
    discarded: AtomicU64,
    high_water: AtomicU64,
}

impl ChannelCounters {
    #[inline]
    pub(crate) fn record_sent(&self, occupied: usize) {
        self.sent.fetch_add(1, Ordering::Relaxed);
        self.high_water
            .fetch_max(saturating_u64(occupied), Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_reset(&self, discarded: usize) {
        self.resets.fetch_add(1, Ordering::Relaxed);
        self.discarded
            .fetch_add(saturating_u64(discarded), Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ChannelStats {
        ChannelStats {
            sent: self.sent.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            high_water: self.high_water.load(Ordering::Relaxed),
        }
    }
}

fn saturating_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
