//! Command line interface.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// How a fatal fault is turned into a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RestartMode {
    /// Abort the process and leave the restart to the process manager.
    Abort,
    /// Tear the pipeline down and build a fresh one in this process.
    #[default]
    InProcess,
}

/// pipeguardd - producer/consumer pipeline with supervised recovery.
#[derive(Debug, Parser)]
#[command(name = "pipeguardd")]
#[command(version)]
#[command(
    about = "Run a pipeguard node: producer, consumer, supervisor and system logger under a watchdog"
)]
pub struct Cli {
    /// YAML configuration file. Missing keys take their defaults.
    #[arg(short, long, env = "PIPEGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit log lines as JSON.
    #[arg(long)]
    pub json: bool,

    /// Override the channel capacity.
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Override the node identity tag.
    #[arg(long)]
    pub node_id: Option<String>,

    /// What to do on a fatal fault.
    #[arg(long, value_enum, default_value_t = RestartMode::InProcess)]
    pub restart_mode: RestartMode,
}
