//! Pipeline bootstrap: build shared state, register tasks, spawn everything.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::Instrument;

use pipeguard_channel::Channel;
use pipeguard_flags::FlagSet;
use pipeguard_watchdog::{FaultHandler, TaskId, TaskWatchdog};

use crate::category::EventCategory;
use crate::config::PipelineConfig;
use crate::consumer::{CONSUMER_TASK, ConsumerTask, ConsumerTiming};
use crate::error::TaskResult;
use crate::producer::{PRODUCER_TASK, ProducerTask};
use crate::scratch::ScratchPool;
use crate::supervisor::{SUPERVISOR_TASK, SupervisorTask};
use crate::sysmon::{LOGGER_TASK, SystemInfoSource, SystemLoggerTask};

/// Every task the pipeline registers with the watchdog.
pub const PIPELINE_TASKS: [TaskId; 4] =
    [PRODUCER_TASK, CONSUMER_TASK, SUPERVISOR_TASK, LOGGER_TASK];

/// A running pipeline.
///
/// Dropping the pipeline aborts every task. There is no graceful stop: the
/// only way out of a running pipeline is a forced abort, typically followed
/// by a fresh [`Pipeline::start`].
#[derive(Debug)]
pub struct Pipeline {
    channel: Arc<Channel<u64>>,
    flags: Arc<FlagSet>,
    scratch: Arc<ScratchPool>,
    watchdog: Arc<TaskWatchdog>,
    tasks: JoinSet<()>,
}

impl Pipeline {
    /// Validate `config`, build shared state and spawn all tasks.
    ///
    /// The watchdog is registered with every task before anything runs and
    /// armed when its monitor starts. Must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a resource
    /// cannot be created. Nothing is spawned in that case.
    pub fn start(
        config: &PipelineConfig,
        fault_handler: Arc<dyn FaultHandler>,
        system_info: Box<dyn SystemInfoSource>,
    ) -> TaskResult<Self> {
        config.validate()?;

        let channel = Arc::new(Channel::with_capacity(config.channel_capacity)?);
        let flags = Arc::new(FlagSet::new());
        let scratch = ScratchPool::with_slots(config.scratch_slots);
        let watchdog = Arc::new(TaskWatchdog::new(config.watchdog, Arc::clone(&fault_handler)));

        let producer = ProducerTask::new(
            Arc::clone(&channel),
            Arc::clone(&flags),
            watchdog.register(PRODUCER_TASK)?,
            config.producer_period(),
        );
        let consumer = ConsumerTask::new(
            Arc::clone(&channel),
            Arc::clone(&flags),
            Arc::clone(&scratch),
            config.escalation,
            watchdog.register(CONSUMER_TASK)?,
            fault_handler,
            ConsumerTiming::from_config(config),
        );
        let supervisor = SupervisorTask::new(
            flags.claim_reader()?,
            watchdog.register(SUPERVISOR_TASK)?,
            config.supervisor_period(),
        );
        let logger = SystemLoggerTask::new(
            system_info,
            watchdog.register(LOGGER_TASK)?,
            config.logger_period(),
        );

        let node = config.node_id.as_str();
        let mut tasks = JoinSet::new();
        tasks.spawn(producer.run().instrument(task_span(node, PRODUCER_TASK)));
        tasks.spawn(consumer.run().instrument(task_span(node, CONSUMER_TASK)));
        tasks.spawn(supervisor.run().instrument(task_span(node, SUPERVISOR_TASK)));
        tasks.spawn(logger.run().instrument(task_span(node, LOGGER_TASK)));

        let monitor = Arc::clone(&watchdog);
        tasks.spawn(
            async move {
                let breach = monitor.monitor().await;
                tracing::debug!(task = %breach.task, "watchdog monitor finished");
            }
            .instrument(tracing::info_span!("watchdog", node = %node)),
        );

        tracing::info!(
            category = EventCategory::Bootstrap.as_str(),
            node = %node,
            capacity = config.channel_capacity,
            tasks = PIPELINE_TASKS.len(),
            "pipeline started"
        );

        Ok(Self {
            channel,
            flags,
            scratch,
            watchdog,
            tasks,
        })
    }

    /// The shared channel.
    #[must_use]
    pub fn channel(&self) -> &Arc<Channel<u64>> {
        &self.channel
    }

    /// The shared flag set. Its reader is already claimed by the supervisor.
    #[must_use]
    pub fn flags(&self) -> &Arc<FlagSet> {
        &self.flags
    }

    /// The consumer's scratch pool.
    #[must_use]
    pub fn scratch(&self) -> &Arc<ScratchPool> {
        &self.scratch
    }

    /// The liveness monitor.
    #[must_use]
    pub fn watchdog(&self) -> &Arc<TaskWatchdog> {
        &self.watchdog
    }

    /// Spawned tasks still running, including the watchdog monitor.
    #[must_use]
    pub fn running_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Forcibly stop every task and wait until all of them are gone.
    ///
    /// Scratch slots held by the consumer at the moment of the abort are
    /// returned as its future is dropped.
    pub async fn abort(mut self) {
        self.tasks.abort_all();
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result
                && !e.is_cancelled()
            {
                tracing::warn!(
                    category = EventCategory::Bootstrap.as_str(),
                    error = %e,
                    "task ended abnormally"
                );
            }
        }
        let stats = self.channel.stats();
        tracing::info!(
            category = EventCategory::Bootstrap.as_str(),
            sent = stats.sent,
            dropped = stats.dropped,
            drop_rate_percent = stats.drop_rate_percent(),
            resets = stats.resets,
            scratch_in_use = self.scratch.in_use(),
            "pipeline aborted"
        );
    }
}

fn task_span(node: &str, task: TaskId) -> tracing::Span {
    tracing::info_span!("task", node = %node, task = %task)
}
