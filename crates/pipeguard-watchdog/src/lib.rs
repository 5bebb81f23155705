//! # pipeguard-watchdog
//!
//! Liveness deadline enforcement for the pipeguard tasks.
//!
//! Every task registers once, before its first loop iteration, and must reset
//! its registration at least once per deadline. When any registered task stays
//! silent for longer than the deadline, the monitor latches into the
//! [`Expired`](WatchdogStatus::Expired) state and invokes the fatal
//! [`FaultHandler`] exactly once. There is no graceful path out of that state:
//! the handler restarts the whole system.
//!
//! ## State Machine
//!
//! ```text
//! ┌──────────┐   arm()   ┌───────┐  deadline missed  ┌─────────┐
//! │ Disarmed │──────────►│ Armed │──────────────────►│ Expired │
//! └──────────┘           └───────┘                   └─────────┘
//!                          │   ▲                       terminal
//!                          └───┘
//!                        reset(task)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pipeguard_watchdog::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), WatchdogError> {
//! let signal = Arc::new(RestartSignal::new());
//! let watchdog = Arc::new(TaskWatchdog::new(WatchdogConfig::new(5000)?, signal.clone()));
//!
//! let producer = watchdog.register(TaskId::new("producer"))?;
//! watchdog.arm()?;
//! producer.reset()?;
//!
//! assert_eq!(watchdog.status(), WatchdogStatus::Armed);
//! assert!(signal.fault().is_none());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs, missing_debug_implementations)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod error;
pub mod fault;
pub mod monitor;
pub mod state;
pub mod task;

pub mod prelude;

pub use config::{WatchdogConfig, WatchdogConfigBuilder};
pub use error::{WatchdogError, WatchdogResult};
pub use fault::{AbortOnFatal, FatalFault, FaultHandler, RestartSignal};
pub use monitor::{Breach, TaskWatchdog, WatchdogHandle};
pub use state::{WatchdogState, WatchdogStatus};
pub use task::TaskId;
