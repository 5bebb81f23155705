//! Staged recovery from consumer starvation.
//!
//! The consumer counts consecutive cycles that found the channel empty. Three
//! thresholds map the count to progressively stronger actions:
//!
//! ```text
//! NORMAL ──miss == warn_at──▶ WARNED ──miss == flush_at──▶ DEGRADED ──miss == restart_at──▶ FATAL
//!    ▲                          │                             │
//!    └──────── successful receive (counter = 0) ──────────────┘
//! ```
//!
//! Each action fires on the exact count, so a single climb triggers each at
//! most once. `Fatal` is terminal: no more actions are produced.

use crate::config::EscalationConfig;

/// Where the miss counter currently sits relative to the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EscalationLevel {
    /// Below `warn_at`.
    Normal,
    /// At or past `warn_at`.
    Warned,
    /// At or past `flush_at`.
    Degraded,
    /// Reached `restart_at`. Terminal.
    Fatal,
}

impl EscalationLevel {
    /// Stable name for log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warned => "warned",
            Self::Degraded => "degraded",
            Self::Fatal => "fatal",
        }
    }
}

/// Action the consumer must take on this miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationAction {
    /// Soft timeout: warn only.
    Warn,
    /// Moderate recovery: discard the channel contents.
    FlushChannel,
    /// Severe recovery: request a full restart.
    Restart,
}

/// One recorded miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Miss {
    /// Consecutive misses including this one, before any post-flush reset.
    pub count: u32,
    /// Action this miss triggers.
    pub action: Option<EscalationAction>,
}

/// Consecutive-miss counter with threshold actions.
#[derive(Debug, Clone)]
pub struct MissTracker {
    policy: EscalationConfig,
    misses: u32,
    flushed: bool,
    fatal: bool,
}

impl MissTracker {
    /// Create a tracker at zero misses.
    #[must_use]
    pub fn new(policy: EscalationConfig) -> Self {
        Self {
            policy,
            misses: 0,
            flushed: false,
            fatal: false,
        }
    }

    /// Record a successful receive. Returns the miss count it cleared.
    pub fn record_success(&mut self) -> u32 {
        if self.fatal {
            return self.misses;
        }
        self.flushed = false;
        std::mem::take(&mut self.misses)
    }

    /// Record an empty receive.
    ///
    /// The returned count is the one the thresholds were compared against,
    /// even when the flush has just reset the counter.
    pub fn record_miss(&mut self) -> Miss {
        if self.fatal {
            return Miss {
                count: self.misses,
                action: None,
            };
        }
        self.misses = self.misses.saturating_add(1);
        let count = self.misses;

        let action = if count == self.policy.warn_at {
            Some(EscalationAction::Warn)
        } else if count == self.policy.flush_at {
            self.flushed = true;
            if self.policy.reset_after_flush {
                self.misses = 0;
            }
            Some(EscalationAction::FlushChannel)
        } else if count == self.policy.restart_at {
            self.fatal = true;
            Some(EscalationAction::Restart)
        } else {
            None
        };
        Miss { count, action }
    }

    /// Consecutive misses so far.
    #[must_use]
    pub fn misses(&self) -> u32 {
        self.misses
    }

    /// Current level.
    #[must_use]
    pub fn level(&self) -> EscalationLevel {
        if self.fatal {
            EscalationLevel::Fatal
        } else if self.misses >= self.policy.flush_at {
            EscalationLevel::Degraded
        } else if self.misses >= self.policy.warn_at {
            EscalationLevel::Warned
        } else {
            EscalationLevel::Normal
        }
    }

    /// Whether the channel has been flushed since the last successful receive.
    #[must_use]
    pub fn flushed_since_success(&self) -> bool {
        self.flushed
    }
}
