//! Watchdog state machine.
//!
//! Transitions are single compare-and-swap operations, so the move into the
//! terminal `Expired` state happens for exactly one caller.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{WatchdogError, WatchdogResult};

/// Watchdog operational status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum WatchdogStatus {
    /// Registrations are accepted but deadlines are not enforced yet.
    #[default]
    Disarmed = 0,
    /// Deadlines are enforced.
    Armed = 1,
    /// A deadline was missed (terminal state).
    Expired = 2,
}

impl WatchdogStatus {
    /// Convert from raw u32 value.
    #[must_use]
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Disarmed),
            1 => Some(Self::Armed),
            2 => Some(Self::Expired),
            _ => None,
        }
    }

    /// Convert to raw u32 value.
    #[must_use]
    pub fn to_raw(self) -> u32 {
        self as u32
    }

    /// Check if the watchdog is in a terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Get the status as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disarmed => "Disarmed",
            Self::Armed => "Armed",
            Self::Expired => "Expired",
        }
    }
}

impl fmt::Display for WatchdogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic watchdog state.
#[derive(Debug)]
pub struct WatchdogState {
    status: AtomicU32,
}

impl Default for WatchdogState {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchdogState {
    /// Create a new state in the `Disarmed` status.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: AtomicU32::new(WatchdogStatus::Disarmed.to_raw()),
        }
    }

    /// Get the current status.
    #[must_use]
    pub fn status(&self) -> WatchdogStatus {
        let raw = self.status.load(Ordering::Acquire);
        WatchdogStatus::from_raw(raw).unwrap_or(WatchdogStatus::Expired)
    }

    /// Transition from `Disarmed` to `Armed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the current state is not `Disarmed`.
    pub fn arm(&self) -> WatchdogResult<()> {
        self.transition(WatchdogStatus::Disarmed, WatchdogStatus::Armed)
    }

    /// Transition from `Armed` to `Expired`.
    ///
    /// Of several concurrent callers, exactly one succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the current state is not `Armed`.
    pub fn expire(&self) -> WatchdogResult<()> {
        self.transition(WatchdogStatus::Armed, WatchdogStatus::Expired)
    }

    fn transition(&self, from: WatchdogStatus, to: WatchdogStatus) -> WatchdogResult<()> {
        self.status
            .compare_exchange(from.to_raw(), to.to_raw(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|current| {
                let current = WatchdogStatus::from_raw(current).unwrap_or(WatchdogStatus::Expired);
                WatchdogError::invalid_transition(current.as_str(), to.as_str())
            })
    }
}
