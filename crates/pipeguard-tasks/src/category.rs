//! Log event categories.
//!
//! Every log line emitted by the pipeline carries a `category` field with one
//! of these values, so a log sink can filter by event kind independently of
//! the message text.

use std::fmt;

use pipeguard_flags::StatusFlags;

/// What the supervisor logs for each status flag.
const SUPERVISOR_EVENTS: [(StatusFlags, EventCategory, &str); 6] = [
    (
        StatusFlags::PRODUCER_OK,
        EventCategory::SupervisorProducerOk,
        "producer delivered",
    ),
    (
        StatusFlags::PRODUCER_FULL,
        EventCategory::SupervisorProducerFull,
        "producer dropped on full channel",
    ),
    (
        StatusFlags::CONSUMER_OK,
        EventCategory::SupervisorConsumerOk,
        "consumer received",
    ),
    (
        StatusFlags::CONSUMER_TIMEOUT,
        EventCategory::SupervisorConsumerTimeout,
        "consumer in soft timeout",
    ),
    (
        StatusFlags::CONSUMER_RESET,
        EventCategory::SupervisorConsumerReset,
        "consumer flushed the channel",
    ),
    (
        StatusFlags::CONSUMER_RESTART,
        EventCategory::SupervisorConsumerRestart,
        "consumer requested restart",
    ),
];

/// Category tag attached to pipeline log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Producer delivered a record.
    ProducerOk,
    /// Producer dropped a record on a full channel.
    ProducerFull,
    /// Consumer received a record.
    ConsumerOk,
    /// Consumer reached the soft-timeout threshold.
    ConsumerTimeout,
    /// Consumer flushed the channel.
    ConsumerReset,
    /// Consumer requested a full restart.
    ConsumerRestart,
    /// Consumer could not obtain a scratch slot.
    AllocError,
    /// Supervisor observed `PRODUCER_OK`.
    SupervisorProducerOk,
    /// Supervisor observed `PRODUCER_FULL`.
    SupervisorProducerFull,
    /// Supervisor observed `CONSUMER_OK`.
    SupervisorConsumerOk,
    /// Supervisor observed `CONSUMER_TIMEOUT`.
    SupervisorConsumerTimeout,
    /// Supervisor observed `CONSUMER_RESET`.
    SupervisorConsumerReset,
    /// Supervisor observed `CONSUMER_RESTART`.
    SupervisorConsumerRestart,
    /// Periodic system information.
    Logger,
    /// Liveness deadline breach.
    Watchdog,
    /// Process bootstrap and restart.
    Bootstrap,
}

impl EventCategory {
    /// Wire name used in the `category` log field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProducerOk => "PRODUCER_OK",
            Self::ProducerFull => "PRODUCER_FULL",
            Self::ConsumerOk => "CONSUMER_OK",
            Self::ConsumerTimeout => "CONSUMER_TIMEOUT",
            Self::ConsumerReset => "CONSUMER_RESET",
            Self::ConsumerRestart => "CONSUMER_RESTART",
            Self::AllocError => "ALLOC_ERROR",
            Self::SupervisorProducerOk => "SUPERVISOR_PRODUCER_OK",
            Self::SupervisorProducerFull => "SUPERVISOR_PRODUCER_FULL",
            Self::SupervisorConsumerOk => "SUPERVISOR_CONSUMER_OK",
            Self::SupervisorConsumerTimeout => "SUPERVISOR_CONSUMER_TIMEOUT",
            Self::SupervisorConsumerReset => "SUPERVISOR_CONSUMER_RESET",
            Self::SupervisorConsumerRestart => "SUPERVISOR_CONSUMER_RESTART",
            Self::Logger => "LOGGER",
            Self::Watchdog => "WATCHDOG",
            Self::Bootstrap => "BOOTSTRAP",
        }
    }

    /// Category and message the supervisor uses for a single `flag`.
    ///
    /// Returns `None` for an empty or multi-bit value.
    #[must_use]
    pub fn supervisor_event(flag: StatusFlags) -> Option<(Self, &'static str)> {
        SUPERVISOR_EVENTS
            .iter()
            .find(|(known, _, _)| *known == flag)
            .map(|&(_, category, message)| (category, message))
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_flag_has_a_supervisor_category() {
        for flag in StatusFlags::all().iter() {
            assert!(EventCategory::supervisor_event(flag).is_some(), "{flag:?}");
        }
    }

    #[test]
    fn test_supervisor_category_names() {
        assert_eq!(
            EventCategory::supervisor_event(StatusFlags::CONSUMER_RESET)
                .map(|(category, _)| category.as_str()),
            Some("SUPERVISOR_CONSUMER_RESET")
        );
        assert_eq!(EventCategory::supervisor_event(StatusFlags::empty()), None);
        assert_eq!(EventCategory::supervisor_event(StatusFlags::PRODUCER), None);
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(EventCategory::AllocError.to_string(), "ALLOC_ERROR");
        assert_eq!(EventCategory::Logger.to_string(), "LOGGER");
    }
}
