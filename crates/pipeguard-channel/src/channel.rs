//! Bounded FIFO channel with non-blocking transfer and explicit flush.
//!
//! The channel is shared by exactly one writer (the producer) and one reader
//! that is also the sole caller of [`Channel::reset`] (the consumer). Nothing
//! in the type enforces that split; it is the pipeline's wiring that does.

use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::error::{ChannelError, ChannelResult};
use crate::stats::{ChannelCounters, ChannelStats};

/// Bounded first-in first-out channel of records.
///
/// Each operation takes the internal lock once, for a bounded amount of work,
/// so `try_send`, `try_receive` and `reset` are atomic relative to one another.
/// Storage for `capacity` records is reserved at construction and never grows.
///
/// # Example
///
/// ```rust
/// use pipeguard_channel::Channel;
///
/// # fn main() -> Result<(), pipeguard_channel::ChannelError> {
/// let channel = Channel::with_capacity(1)?;
/// assert_eq!(channel.try_send(7_u64), Ok(()));
/// assert!(channel.is_full());
/// assert_eq!(channel.try_receive(), Some(7));
/// assert!(channel.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Channel<T> {
    capacity: usize,
    slots: Mutex<VecDeque<T>>,
    counters: ChannelCounters,
}

impl<T> Channel<T> {
    /// Create a channel holding at most `capacity` records.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::ZeroCapacity`] if `capacity` is 0.
    pub fn with_capacity(capacity: usize) -> ChannelResult<Self> {
        if capacity == 0 {
            return Err(ChannelError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            slots: Mutex::new(VecDeque::with_capacity(capacity)),
            counters: ChannelCounters::default(),
        })
    }

    /// Append a record if there is room.
    ///
    /// # RT Safety
    ///
    /// Never blocks beyond the bounded critical section and never allocates.
    ///
    /// # Errors
    ///
    /// Returns `Err(value)` with the rejected record, leaving the channel
    /// untouched, when the occupied count equals the capacity.
    pub fn try_send(&self, value: T) -> Result<(), T> {
        let occupied = {
            let mut slots = self.slots.lock();
            if slots.len() >= self.capacity {
                drop(slots);
                self.counters.record_dropped();
                return Err(value);
            }
            slots.push_back(value);
            slots.len()
        };
        self.counters.record_sent(occupied);
        Ok(())
    }

    /// Remove and return the oldest record, or `None` if the channel is empty.
    pub fn try_receive(&self) -> Option<T> {
        let value = self.slots.lock().pop_front();
        if value.is_some() {
            self.counters.record_received();
        }
        value
    }

    /// Discard every record currently held.
    ///
    /// Returns the number of records discarded. A `try_receive` that follows a
    /// `reset` on the same thread observes an empty channel.
    pub fn reset(&self) -> usize {
        let discarded = {
            let mut slots = self.slots.lock();
            let discarded = slots.len();
            slots.clear();
            discarded
        };
        self.counters.record_reset(discarded);
        discarded
    }

    /// Maximum number of records the channel holds.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current occupied count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Whether the channel currently holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    /// Whether the occupied count equals the capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.lock().len() >= self.capacity
    }

    /// Snapshot of the transfer counters.
    #[must_use]
    pub fn stats(&self) -> ChannelStats {
        self.counters.snapshot()
    }
}
