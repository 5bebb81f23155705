//! Bounded scratch pool for the consumer.
//!
//! The consumer needs a scratch slot every cycle to hold the received record.
//! The pool is sized up front and never grows, so exhaustion is an ordinary
//! outcome ([`ScratchPool::try_acquire`] returns `None`) rather than a
//! reason to stop. A slot returns to the pool when its guard is dropped, on
//! every exit path.

use parking_lot::Mutex;
use std::sync::Arc;

/// Fixed-size pool of scratch slots.
#[derive(Debug)]
pub struct ScratchPool {
    free: Mutex<Vec<Box<u64>>>,
    slots: usize,
}

impl ScratchPool {
    /// Create a pool with `slots` preallocated slots.
    #[must_use]
    pub fn with_slots(slots: usize) -> Arc<Self> {
        Arc::new(Self {
            free: Mutex::new((0..slots).map(|_| Box::new(0)).collect()),
            slots,
        })
    }

    /// Take a slot, or `None` when every slot is in use.
    #[must_use]
    pub fn try_acquire(self: &Arc<Self>) -> Option<ScratchSlot> {
        let buffer = self.free.lock().pop()?;
        Some(ScratchSlot {
            buffer: Some(buffer),
            pool: Arc::clone(self),
        })
    }

    /// Total slot count.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Slots currently available.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }

    /// Slots currently held by guards.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.slots.saturating_sub(self.available())
    }
}

/// A scratch slot on loan from a [`ScratchPool`].
#[derive(Debug)]
pub struct ScratchSlot {
    buffer: Option<Box<u64>>,
    pool: Arc<ScratchPool>,
}

impl ScratchSlot {
    /// Write `value` into the slot.
    pub fn store(&mut self, value: u64) {
        if let Some(buffer) = self.buffer.as_mut() {
            **buffer = value;
        }
    }

    /// Last value written into the slot.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.buffer.as_deref().copied().unwrap_or_default()
    }
}

impl Drop for ScratchSlot {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.pool.free.lock().push(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustion_returns_none() {
        let pool = ScratchPool::with_slots(2);
        let first = pool.try_acquire();
        let second = pool.try_acquire();
        assert!(first.is_some());
        assert!(second.is_some());
        assert!(pool.try_acquire().is_none());
        assert_eq!(pool.in_use(), 2);
    }

    #[test]
    fn test_drop_returns_slot() {
        let pool = ScratchPool::with_slots(1);
        {
            let mut slot = pool.try_acquire();
            assert_eq!(pool.available(), 0);
            if let Some(slot) = slot.as_mut() {
                slot.store(42);
                assert_eq!(slot.get(), 42);
            }
        }
        assert_eq!(pool.available(), 1);
        assert!(pool.try_acquire().is_some());
    }

    #[test]
    fn test_empty_pool_never_yields() {
        let pool = ScratchPool::with_slots(0);
        assert!(pool.try_acquire().is_none());
        assert_eq!(pool.slots(), 0);
    }
}
