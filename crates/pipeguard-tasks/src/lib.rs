//! # pipeguard-tasks
//!
//! The four periodic tasks of a pipeguard node and the bootstrap that wires
//! them together.
//!
//! | Task | Period | Role |
//! |------|--------|------|
//! | producer | 1000ms | one counter value per cycle into the channel; drops on full |
//! | consumer | 500ms | one receive per cycle; staged recovery on starvation |
//! | supervisor | 2000ms | sole flag reader; one log line per observed flag |
//! | logger | 3000ms | core count, revision and free memory |
//!
//! Tasks never talk to each other directly. They share a bounded
//! [`Channel`](pipeguard_channel::Channel), a [`FlagSet`](pipeguard_flags::FlagSet)
//! and a [`TaskWatchdog`](pipeguard_watchdog::TaskWatchdog). Every task
//! refreshes the watchdog once per loop iteration; the consumer also does so
//! on its allocation back-off path.
//!
//! ## Starvation recovery
//!
//! The consumer counts consecutive empty receives and acts on exact counts:
//! a warning at 10, a channel flush at 20 and a restart request at 30. See
//! [`escalation`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pipeguard_tasks::prelude::*;
//! use pipeguard_watchdog::RestartSignal;
//!
//! # async fn run() -> Result<(), TaskError> {
//! let signal = Arc::new(RestartSignal::new());
//! let pipeline = Pipeline::start(
//!     &PipelineConfig::default(),
//!     signal.clone(),
//!     Box::new(HostSystemInfo::new()),
//! )?;
//! if let Some(fault) = signal.triggered().await {
//!     eprintln!("restarting after {fault}");
//! }
//! pipeline.abort().await;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs, missing_debug_implementations)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod category;
pub mod config;
pub mod consumer;
pub mod error;
pub mod escalation;
pub mod pipeline;
pub mod producer;
pub mod scratch;
pub mod supervisor;
pub mod sysmon;

mod liveness;
#[cfg(test)]
mod test_support;

pub mod prelude;

pub use category::EventCategory;
pub use config::{EscalationConfig, PipelineConfig, PipelineConfigBuilder};
pub use consumer::{CONSUMER_TASK, ConsumerCycle, ConsumerTask, ConsumerTiming};
pub use error::{TaskError, TaskResult};
pub use escalation::{EscalationAction, EscalationLevel, Miss, MissTracker};
pub use pipeline::{PIPELINE_TASKS, Pipeline};
pub use producer::{PRODUCER_TASK, ProducerCycle, ProducerTask};
pub use scratch::{ScratchPool, ScratchSlot};
pub use supervisor::{SUPERVISOR_TASK, SupervisorTask};
pub use sysmon::{HostSystemInfo, LOGGER_TASK, SystemInfo, SystemInfoSource, SystemLoggerTask};
