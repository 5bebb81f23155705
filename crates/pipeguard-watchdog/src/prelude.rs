//! Prelude for pipeguard-watchdog.
//!
//! This module re-exports the most commonly used types for convenient importing.

pub use crate::config::{WatchdogConfig, WatchdogConfigBuilder};
pub use crate::error::{WatchdogError, WatchdogResult};
pub use crate::fault::{AbortOnFatal, FatalFault, FaultHandler, RestartSignal};
pub use crate::monitor::{Breach, TaskWatchdog, WatchdogHandle};
pub use crate::state::{WatchdogState, WatchdogStatus};
pub use crate::task::TaskId;
