//! # pipeguard-flags
//!
//! Shared status flag set used by the pipeline tasks to report outcomes to the
//! supervisor.
//!
//! Writers merge bits with a bitwise OR and never observe each other. The
//! supervisor drains bits with a scoped read-and-clear: exactly the bits it
//! reads are cleared, atomically with the read, and nothing outside the
//! requested mask is touched.
//!
//! ## Single reader
//!
//! Clear-on-read is only loss-free with a single reader. Two readers draining
//! the same mask race for each bit and whichever wins consumes it; the other
//! never sees it. [`FlagSet::claim_reader`] hands out one [`FlagDrain`] and
//! refuses a second claim while the first is alive.
//!
//! ## Example
//!
//! ```rust
//! use pipeguard_flags::prelude::*;
//!
//! let flags = FlagSet::new();
//! flags.set(StatusFlags::PRODUCER_OK | StatusFlags::CONSUMER_TIMEOUT);
//!
//! let seen = flags.poll_any(StatusFlags::PRODUCER_OK, true);
//! assert_eq!(seen, StatusFlags::PRODUCER_OK);
//! assert_eq!(flags.snapshot(), StatusFlags::CONSUMER_TIMEOUT);
//! ```

#![deny(missing_docs, missing_debug_implementations)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod flag_set;
pub mod flags;

pub mod prelude;

pub use error::{FlagError, FlagResult};
pub use flag_set::{FlagDrain, FlagSet};
pub use flags::StatusFlags;
