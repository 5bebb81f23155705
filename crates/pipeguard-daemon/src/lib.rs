//! # pipeguard-daemon
//!
//! Process shell for a pipeguard node: command line parsing, configuration
//! loading, log subscriber setup and the restart supervisor that rebuilds the
//! pipeline after each fatal fault.
//!
//! The binary is `pipeguardd`. Everything it does is exposed here so the
//! restart behavior can be exercised without a process boundary.

#![deny(missing_docs, missing_debug_implementations)]
#![warn(clippy::pedantic)]

pub mod cli;
pub mod daemon;
pub mod logging;
pub mod settings;

pub use cli::{Cli, RestartMode};
pub use daemon::{Daemon, DaemonReport, GenerationOutcome};
