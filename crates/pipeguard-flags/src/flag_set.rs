//! Shared flag storage with OR-merge writes and scoped read-and-clear.

use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use crate::error::{FlagError, FlagResult};
use crate::flags::StatusFlags;

/// Shared bitmask of [`StatusFlags`].
///
/// Writes are a single `fetch_or` and are safe from any number of tasks.
/// Reads with `clear_on_exit` are a single `fetch_and` and are only loss-free
/// with one reader; see [`FlagSet::claim_reader`].
///
/// None of the operations suspend the caller unless `wait_any` is given a
/// non-zero timeout.
#[derive(Debug, Default)]
pub struct FlagSet {
    bits: AtomicU32,
    changed: Notify,
    reader_claimed: AtomicBool,
}

impl FlagSet {
    /// Create a flag set with every bit clear.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `flags` into the set with a bitwise OR.
    ///
    /// Returns the bits that were set immediately after the merge.
    pub fn set(&self, flags: StatusFlags) -> StatusFlags {
        let previous = self.bits.fetch_or(flags.bits(), Ordering::AcqRel);
        self.changed.notify_waiters();
        StatusFlags::from_bits_truncate(previous | flags.bits())
    }

    /// Current bits, without clearing anything.
    #[must_use]
    pub fn snapshot(&self) -> StatusFlags {
        StatusFlags::from_bits_truncate(self.bits.load(Ordering::Acquire))
    }

    /// Non-blocking read of the bits of `mask` that are currently set.
    ///
    /// With `clear_on_exit`, exactly the returned bits are cleared in the same
    /// atomic step as the read. Bits outside `mask` are never touched, and
    /// bits set by a writer after the read survive for the next poll.
    pub fn poll_any(&self, mask: StatusFlags, clear_on_exit: bool) -> StatusFlags {
        let previous = if clear_on_exit {
            self.bits.fetch_and(!mask.bits(), Ordering::AcqRel)
        } else {
            self.bits.load(Ordering::Acquire)
        };
        StatusFlags::from_bits_truncate(previous) & mask
    }

    /// Return the bits of `mask` that are set, waiting up to `timeout` for one.
    ///
    /// A zero timeout is a single [`poll_any`](Self::poll_any) and never
    /// suspends. Otherwise the caller is woken by any `set` and polls again
    /// until a bit of `mask` shows up or the timeout elapses, in which case the
    /// (empty) result of a final poll is returned.
    pub async fn wait_any(
        &self,
        mask: StatusFlags,
        clear_on_exit: bool,
        timeout: Duration,
    ) -> StatusFlags {
        let found = self.poll_any(mask, clear_on_exit);
        if !found.is_empty() || timeout.is_zero() {
            return found;
        }

        // `None` when the timeout is too large to represent: wait without a deadline.
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let mut notified = pin!(self.changed.notified());
            notified.as_mut().enable();

            let found = self.poll_any(mask, clear_on_exit);
            if !found.is_empty() {
                return found;
            }
            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        return self.poll_any(mask, clear_on_exit);
                    }
                }
                None => notified.await,
            }
        }
    }

    /// Claim the exclusive clear-on-read handle.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::ReaderAlreadyClaimed`] while another
    /// [`FlagDrain`] for this set is alive.
    pub fn claim_reader(self: &Arc<Self>) -> FlagResult<FlagDrain> {
        if self
            .reader_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("rejected second flag reader; concurrent draining would lose bits");
            return Err(FlagError::ReaderAlreadyClaimed);
        }
        Ok(FlagDrain {
            flags: Arc::clone(self),
        })
    }

    /// Whether a [`FlagDrain`] is currently alive.
    #[must_use]
    pub fn has_reader(&self) -> bool {
        self.reader_claimed.load(Ordering::Acquire)
    }
}

/// Exclusive clear-on-read handle to a [`FlagSet`].
///
/// Dropping the handle releases the claim.
#[derive(Debug)]
pub struct FlagDrain {
    flags: Arc<FlagSet>,
}

impl FlagDrain {
    /// Read and clear the bits of `mask` that are currently set.
    pub fn drain(&self, mask: StatusFlags) -> StatusFlags {
        self.flags.poll_any(mask, true)
    }

    /// Read and clear every currently set flag.
    pub fn drain_all(&self) -> StatusFlags {
        self.drain(StatusFlags::all())
    }
}

impl Drop for FlagDrain {
    fn drop(&mut self) {
        self.flags.reader_claimed.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_merges_bits() {
        let flags = FlagSet::new();
        flags.set(StatusFlags::PRODUCER_OK);
        let merged = flags.set(StatusFlags::CONSUMER_OK);
        assert_eq!(merged, StatusFlags::PRODUCER_OK | StatusFlags::CONSUMER_OK);
        assert_eq!(flags.snapshot(), merged);
    }

    #[test]
    fn test_poll_without_clear_keeps_bits() {
        let flags = FlagSet::new();
        flags.set(StatusFlags::PRODUCER_FULL);
        assert_eq!(
            flags.poll_any(StatusFlags::all(), false),
            StatusFlags::PRODUCER_FULL
        );
        assert_eq!(flags.snapshot(), StatusFlags::PRODUCER_FULL);
    }

    #[test]
    fn test_poll_clears_only_masked_bits() {
        let flags = FlagSet::new();
        flags.set(StatusFlags::PRODUCER_OK | StatusFlags::CONSUMER_RESET);

        let seen = flags.poll_any(StatusFlags::PRODUCER, true);
        assert_eq!(seen, StatusFlags::PRODUCER_OK);
        assert_eq!(flags.snapshot(), StatusFlags::CONSUMER_RESET);
    }

    #[test]
    fn test_poll_on_empty_set() {
        let flags = FlagSet::new();
        assert!(flags.poll_any(StatusFlags::all(), true).is_empty());
    }

    #[test]
    fn test_second_reader_rejected() -> FlagResult<()> {
        let flags = Arc::new(FlagSet::new());
        let reader = flags.claim_reader()?;
        assert!(flags.has_reader());
        assert!(matches!(
            flags.claim_reader(),
            Err(FlagError::ReaderAlreadyClaimed)
        ));

        drop(reader);
        assert!(!flags.has_reader());
        let _again = flags.claim_reader()?;
        Ok(())
    }

    #[test]
    fn test_drain_all() -> FlagResult<()> {
        let flags = Arc::new(FlagSet::new());
        let reader = flags.claim_reader()?;
        flags.set(StatusFlags::all());
        assert_eq!(reader.drain_all(), StatusFlags::all());
        assert!(reader.drain_all().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_timeout_is_a_poll() {
        let flags = FlagSet::new();
        let seen = flags
            .wait_any(StatusFlags::all(), true, Duration::ZERO)
            .await;
        assert!(seen.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_empty() {
        let flags = FlagSet::new();
        let started = Instant::now();
        let seen = flags
            .wait_any(StatusFlags::CONSUMER, true, Duration::from_millis(50))
            .await;
        assert!(seen.is_empty());
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_with_unbounded_timeout() -> Result<(), tokio::task::JoinError> {
        let flags = Arc::new(FlagSet::new());
        flags.set(StatusFlags::PRODUCER_OK);

        let pending = tokio::time::timeout(
            Duration::from_millis(50),
            flags.wait_any(StatusFlags::CONSUMER, true, Duration::MAX),
        )
        .await;
        assert!(matches!(pending, Err(_)));

        let writer = {
            let flags = Arc::clone(&flags);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                flags.set(StatusFlags::CONSUMER_RESET);
            })
        };
        let seen = flags
            .wait_any(StatusFlags::CONSUMER, true, Duration::MAX)
            .await;
        writer.await?;
        assert_eq!(seen, StatusFlags::CONSUMER_RESET);
        assert_eq!(flags.snapshot(), StatusFlags::PRODUCER_OK);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_woken_by_set() -> Result<(), tokio::task::JoinError> {
        let flags = Arc::new(FlagSet::new());
        let writer = {
            let flags = Arc::clone(&flags);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                flags.set(StatusFlags::CONSUMER_OK);
            })
        };

        let seen = flags
            .wait_any(StatusFlags::CONSUMER_OK, true, Duration::from_secs(1))
            .await;
        writer.await?;
        assert_eq!(seen, StatusFlags::CONSUMER_OK);
        assert!(flags.snapshot().is_empty());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_ignores_bits_outside_mask() {
        let flags = FlagSet::new();
        flags.set(StatusFlags::PRODUCER_OK);
        let seen = flags
            .wait_any(StatusFlags::CONSUMER, true, Duration::from_millis(20))
            .await;
        assert!(seen.is_empty());
        assert_eq!(flags.snapshot(), StatusFlags::PRODUCER_OK);
    }
}
