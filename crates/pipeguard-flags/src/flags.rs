//! Named status bits.

use bitflags::bitflags;

bitflags! {
    /// Status bits raised by the producer and consumer tasks.
    ///
    /// The bit layout is stable; unused bits are never set.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StatusFlags: u32 {
        /// Producer delivered a value.
        const PRODUCER_OK      = 1 << 0;
        /// Producer dropped a value because the channel was full.
        const PRODUCER_FULL    = 1 << 1;
        /// Consumer received a value.
        const CONSUMER_OK      = 1 << 2;
        /// Consumer reached the soft-warning miss threshold.
        const CONSUMER_TIMEOUT = 1 << 3;
        /// Consumer flushed the channel as moderate recovery.
        const CONSUMER_RESET   = 1 << 4;
        /// Consumer requested a full restart.
        const CONSUMER_RESTART = 1 << 5;
    }
}

impl StatusFlags {
    /// Flags raised by the producer.
    pub const PRODUCER: Self = Self::PRODUCER_OK.union(Self::PRODUCER_FULL);

    /// Flags raised by the consumer.
    pub const CONSUMER: Self = Self::CONSUMER_OK
        .union(Self::CONSUMER_TIMEOUT)
        .union(Self::CONSUMER_RESET)
        .union(Self::CONSUMER_RESTART);

    /// Escalation flags, excluding the plain success bit.
    pub const ESCALATION: Self = Self::CONSUMER_TIMEOUT
        .union(Self::CONSUMER_RESET)
        .union(Self::CONSUMER_RESTART);

    /// Whether any escalation bit is set.
    #[must_use]
    pub fn is_escalation(self) -> bool {
        self.intersects(Self::ESCALATION)
    }
}
