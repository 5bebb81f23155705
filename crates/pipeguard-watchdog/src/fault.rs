//! Fatal fault capability.
//!
//! The watchdog and the consumer's final escalation stage both end in a call
//! to a [`FaultHandler`]. What "restart" means is up to the deployment:
//! [`RestartSignal`] wakes an in-process supervisor that rebuilds the system,
//! [`AbortOnFatal`] kills the process and leaves the restart to whatever
//! manages it. Neither persists or drains any state.

use std::fmt;
use std::time::Duration;

use tokio::sync::watch;

use crate::task::TaskId;

/// Reason for an unconditional restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FatalFault {
    /// A task reached its final consecutive-miss threshold.
    MissLimit {
        /// Task that escalated.
        task: TaskId,
        /// Consecutive misses at the time of escalation.
        misses: u32,
    },
    /// A registered task missed its liveness deadline.
    WatchdogExpired {
        /// First task found past the deadline.
        task: TaskId,
        /// Time since that task's last reset.
        silent_for: Duration,
    },
}

impl FatalFault {
    /// Task responsible for the fault.
    #[must_use]
    pub fn task(&self) -> TaskId {
        match self {
            Self::MissLimit { task, .. } | Self::WatchdogExpired { task, .. } => *task,
        }
    }
}

impl fmt::Display for FatalFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissLimit { task, misses } => {
                write!(f, "{task} reached {misses} consecutive misses")
            }
            Self::WatchdogExpired { task, silent_for } => {
                write!(f, "{task} silent for {}ms", silent_for.as_millis())
            }
        }
    }
}

/// Capability invoked on an unrecoverable fault.
///
/// Implementations must not block and must tolerate being called from any
/// task. Callers treat the call as the end of their own work.
pub trait FaultHandler: Send + Sync {
    /// Restart the system because of `fault`.
    fn on_fatal(&self, fault: &FatalFault);
}

impl<F> FaultHandler for F
where
    F: Fn(&FatalFault) + Send + Sync,
{
    fn on_fatal(&self, fault: &FatalFault) {
        self(fault);
    }
}

/// Fault handler that wakes an in-process restart loop.
///
/// The first fault is kept; later ones (for example a watchdog breach caused
/// by the tasks being torn down) are logged and ignored.
#[derive(Debug)]
pub struct RestartSignal {
    sender: watch::Sender<Option<FatalFault>>,
}

impl Default for RestartSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RestartSignal {
    /// Create an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// The recorded fault, if any.
    #[must_use]
    pub fn fault(&self) -> Option<FatalFault> {
        self.sender.borrow().clone()
    }

    /// Wait until a fault is recorded and return it.
    pub async fn triggered(&self) -> Option<FatalFault> {
        let mut receiver = self.sender.subscribe();
        receiver
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|fault| fault.clone())
    }
}

impl FaultHandler for RestartSignal {
    fn on_fatal(&self, fault: &FatalFault) {
        let recorded = self.sender.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(fault.clone());
            true
        });
        if !recorded {
            tracing::debug!(%fault, "restart already requested; ignoring");
        }
    }
}

/// Fault handler that aborts the process.
///
/// For deployments where an external process manager performs the restart.
#[derive(Debug, Default, Clone, Copy)]
pub struct AbortOnFatal;

impl FaultHandler for AbortOnFatal {
    fn on_fatal(&self, fault: &FatalFault) {
        tracing::error!(category = "BOOTSTRAP", %fault, "aborting process for restart");
        std::process::abort();
    }
}
