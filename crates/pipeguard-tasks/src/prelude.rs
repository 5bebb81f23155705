//! Prelude for pipeguard-tasks.
//!
//! This module re-exports the most commonly used types for convenient importing.

pub use crate::category::EventCategory;
pub use crate::config::{EscalationConfig, PipelineConfig, PipelineConfigBuilder};
pub use crate::consumer::{ConsumerCycle, ConsumerTask, ConsumerTiming};
pub use crate::error::{TaskError, TaskResult};
pub use crate::escalation::{EscalationAction, EscalationLevel, Miss, MissTracker};
pub use crate::pipeline::Pipeline;
pub use crate::producer::{ProducerCycle, ProducerTask};
pub use crate::scratch::{ScratchPool, ScratchSlot};
pub use crate::supervisor::SupervisorTask;
pub use crate::sysmon::{HostSystemInfo, SystemInfo, SystemInfoSource, SystemLoggerTask};
