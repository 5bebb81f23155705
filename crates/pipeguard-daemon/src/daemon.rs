//! Restart supervisor: runs pipeline generations until shutdown.
//!
//! A generation is one [`Pipeline`] built from scratch. In
//! [`RestartMode::InProcess`] a fatal fault ends the generation: every task
//! is aborted, all shared state is dropped and the next generation starts
//! with an empty channel, cleared flags and zero counters. Nothing survives a
//! restart except the generation number.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use pipeguard_tasks::{EventCategory, HostSystemInfo, Pipeline, PipelineConfig, SystemInfoSource};
use pipeguard_watchdog::{AbortOnFatal, FatalFault, RestartSignal};

use crate::cli::RestartMode;

type SystemInfoFactory = Box<dyn Fn() -> Box<dyn SystemInfoSource> + Send + Sync>;

/// How a generation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// A fatal fault requested a restart.
    Restarted(FatalFault),
    /// The shutdown future completed.
    Shutdown,
}

/// Summary returned by [`Daemon::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonReport {
    /// Generations started, including the first.
    pub generations: u64,
    /// Faults that ended a generation, oldest first.
    pub faults: Vec<FatalFault>,
}

/// Owns the configuration and rebuilds the pipeline after each fault.
pub struct Daemon {
    config: PipelineConfig,
    mode: RestartMode,
    system_info: SystemInfoFactory,
}

impl fmt::Debug for Daemon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Daemon")
            .field("config", &self.config)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Daemon {
    /// Create a daemon that reads host system information.
    #[must_use]
    pub fn new(config: PipelineConfig, mode: RestartMode) -> Self {
        Self {
            config,
            mode,
            system_info: Box::new(|| -> Box<dyn SystemInfoSource> {
                Box::new(HostSystemInfo::new())
            }),
        }
    }

    /// Replace the system information source used by every generation.
    #[must_use]
    pub fn with_system_info<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn SystemInfoSource> + Send + Sync + 'static,
    {
        self.system_info = Box::new(factory);
        self
    }

    /// Run generations until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns an error if a generation cannot be started.
    pub async fn run<S>(self, shutdown: S) -> Result<DaemonReport>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut report = DaemonReport::default();
        loop {
            report.generations = report.generations.saturating_add(1);
            let outcome = self
                .run_generation(report.generations, &mut shutdown)
                .await
                .with_context(|| format!("generation {} failed to start", report.generations))?;
            match outcome {
                GenerationOutcome::Restarted(fault) => report.faults.push(fault),
                GenerationOutcome::Shutdown => return Ok(report),
            }
        }
    }

    async fn run_generation<S>(
        &self,
        generation: u64,
        shutdown: &mut std::pin::Pin<&mut S>,
    ) -> Result<GenerationOutcome>
    where
        S: Future<Output = ()>,
    {
        match self.mode {
            RestartMode::InProcess => {
                let signal = Arc::new(RestartSignal::new());
                let pipeline = Pipeline::start(&self.config, signal.clone(), (self.system_info)())?;
                tracing::info!(
                    category = EventCategory::Bootstrap.as_str(),
                    generation,
                    mode = "in-process",
                    "generation started"
                );

                let outcome = tokio::select! {
                    fault = signal.triggered() => match fault {
                        Some(fault) => GenerationOutcome::Restarted(fault),
                        None => GenerationOutcome::Shutdown,
                    },
                    () = shutdown.as_mut() => GenerationOutcome::Shutdown,
                };
                pipeline.abort().await;

                if let GenerationOutcome::Restarted(fault) = &outcome {
                    tracing::error!(
                        category = EventCategory::Bootstrap.as_str(),
                        generation,
                        %fault,
                        "restarting pipeline"
                    );
                }
                Ok(outcome)
            }
            RestartMode::Abort => {
                let pipeline =
                    Pipeline::start(&self.config, Arc::new(AbortOnFatal), (self.system_info)())?;
                tracing::info!(
                    category = EventCategory::Bootstrap.as_str(),
                    generation,
                    mode = "abort",
                    "generation started"
                );
                shutdown.as_mut().await;
                pipeline.abort().await;
                Ok(GenerationOutcome::Shutdown)
            }
        }
    }
}
