//! Per-task liveness registry and the monitor loop that enforces it.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use crate::config::WatchdogConfig;
use crate::error::{WatchdogError, WatchdogResult};
use crate::fault::{FatalFault, FaultHandler};
use crate::state::{WatchdogState, WatchdogStatus};
use crate::task::TaskId;

#[derive(Debug, Clone, Copy)]
struct Registration {
    last_reset: Instant,
    reset_count: u64,
}

/// A deadline breach reported by [`TaskWatchdog::check_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breach {
    /// Task found past the deadline.
    pub task: TaskId,
    /// Time since that task's last reset.
    pub silent_for: Duration,
}

/// Liveness monitor shared by every task.
///
/// Tasks hold a [`WatchdogHandle`] obtained from [`register`](Self::register)
/// and call [`WatchdogHandle::reset`] once per loop iteration. The monitor
/// loop ([`monitor`](Self::monitor)) samples registrations every
/// `check_interval_ms` and fires the fault handler on the first breach.
pub struct TaskWatchdog {
    config: WatchdogConfig,
    state: WatchdogState,
    registrations: Mutex<HashMap<TaskId, Registration>>,
    handler: Arc<dyn FaultHandler>,
}

impl fmt::Debug for TaskWatchdog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskWatchdog")
            .field("config", &self.config)
            .field("status", &self.state.status())
            .field("registered", &self.registrations.lock().len())
            .finish_non_exhaustive()
    }
}

impl TaskWatchdog {
    /// Create a disarmed watchdog that reports breaches to `handler`.
    #[must_use]
    pub fn new(config: WatchdogConfig, handler: Arc<dyn FaultHandler>) -> Self {
        Self {
            config,
            state: WatchdogState::new(),
            registrations: Mutex::new(HashMap::new()),
            handler,
        }
    }

    /// Register `task`. Its deadline starts counting now.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::AlreadyRegistered`] for a duplicate task and
    /// [`WatchdogError::Expired`] once the watchdog has fired.
    pub fn register(self: &Arc<Self>, task: TaskId) -> WatchdogResult<WatchdogHandle> {
        if self.state.status().is_terminal() {
            return Err(WatchdogError::Expired);
        }
        let mut registrations = self.registrations.lock();
        if registrations.contains_key(&task) {
            return Err(WatchdogError::AlreadyRegistered(task));
        }
        registrations.insert(
            task,
            Registration {
                last_reset: Instant::now(),
                reset_count: 0,
            },
        );
        drop(registrations);

        tracing::debug!(%task, "registered with watchdog");
        Ok(WatchdogHandle {
            task,
            watchdog: Arc::clone(self),
        })
    }

    /// Start enforcing deadlines.
    ///
    /// Every registration's deadline restarts from the moment of arming.
    ///
    /// # Errors
    ///
    /// Returns an error if the watchdog is not `Disarmed`.
    pub fn arm(&self) -> WatchdogResult<()> {
        self.state.arm()?;
        let now = Instant::now();
        for registration in self.registrations.lock().values_mut() {
            registration.last_reset = now;
        }
        Ok(())
    }

    /// Prove liveness for `task`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::NotRegistered`] for an unknown task and
    /// [`WatchdogError::Expired`] once the watchdog has fired.
    pub fn reset(&self, task: TaskId) -> WatchdogResult<()> {
        if self.state.status().is_terminal() {
            return Err(WatchdogError::Expired);
        }
        let mut registrations = self.registrations.lock();
        let registration = registrations
            .get_mut(&task)
            .ok_or(WatchdogError::NotRegistered(task))?;
        registration.last_reset = Instant::now();
        registration.reset_count = registration.reset_count.saturating_add(1);
        Ok(())
    }

    /// Check every registration against the deadline at `now`.
    ///
    /// On the first breach the watchdog moves to `Expired`, the fault handler
    /// runs once and the breach is returned. Every later call returns `None`,
    /// so a breach is never reported twice.
    pub fn check_at(&self, now: Instant) -> Option<Breach> {
        if self.state.status() != WatchdogStatus::Armed {
            return None;
        }

        let timeout = self.config.timeout();
        let breach = self
            .registrations
            .lock()
            .iter()
            .map(|(task, registration)| Breach {
                task: *task,
                silent_for: now.saturating_duration_since(registration.last_reset),
            })
            .filter(|breach| breach.silent_for > timeout)
            .max_by_key(|breach| breach.silent_for)?;

        if self.state.expire().is_err() {
            return None;
        }

        tracing::error!(
            category = "WATCHDOG",
            task = %breach.task,
            silent_ms = u64::try_from(breach.silent_for.as_millis()).unwrap_or(u64::MAX),
            timeout_ms = self.config.timeout_ms,
            "liveness deadline missed; restarting"
        );
        self.handler.on_fatal(&FatalFault::WatchdogExpired {
            task: breach.task,
            silent_for: breach.silent_for,
        });
        Some(breach)
    }

    /// Arm (if still disarmed) and sample registrations until a breach.
    ///
    /// Returns the breach after the fault handler has run. The loop never
    /// returns otherwise.
    pub async fn monitor(self: Arc<Self>) -> Breach {
        if self.state.status() == WatchdogStatus::Disarmed
            && let Err(e) = self.arm()
        {
            tracing::debug!(error = %e, "watchdog armed concurrently");
        }

        let mut ticker = tokio::time::interval(self.config.check_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            let now = ticker.tick().await;
            if let Some(breach) = self.check_at(now) {
                return breach;
            }
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> WatchdogStatus {
        self.state.status()
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    /// Registered tasks, sorted by name.
    #[must_use]
    pub fn registered_tasks(&self) -> Vec<TaskId> {
        let mut tasks: Vec<TaskId> = self.registrations.lock().keys().copied().collect();
        tasks.sort_unstable();
        tasks
    }

    /// Number of resets recorded for `task`.
    #[must_use]
    pub fn reset_count(&self, task: TaskId) -> Option<u64> {
        self.registrations
            .lock()
            .get(&task)
            .map(|registration| registration.reset_count)
    }

    /// Time since `task` last proved liveness.
    #[must_use]
    pub fn time_since_reset(&self, task: TaskId) -> Option<Duration> {
        self.registrations
            .lock()
            .get(&task)
            .map(|registration| registration.last_reset.elapsed())
    }
}

/// A task's registration with the watchdog.
#[derive(Debug)]
pub struct WatchdogHandle {
    task: TaskId,
    watchdog: Arc<TaskWatchdog>,
}

impl WatchdogHandle {
    /// Prove liveness for this task.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::Expired`] once the watchdog has fired.
    pub fn reset(&self) -> WatchdogResult<()> {
        self.watchdog.reset(self.task)
    }

    /// The registered task.
    #[must_use]
    pub fn task(&self) -> TaskId {
        self.task
    }
}
