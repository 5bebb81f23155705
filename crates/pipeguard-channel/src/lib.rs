//! # pipeguard-channel
//!
//! Bounded, non-blocking record channel shared between the pipeguard producer
//! and consumer tasks.
//!
//! ## Guarantees
//!
//! - **Bounded**: the occupied count never exceeds the capacity fixed at
//!   construction.
//! - **Non-blocking**: `try_send` and `try_receive` return immediately; a full
//!   channel hands the rejected record back, an empty one yields `None`.
//! - **Per-operation atomicity**: `try_send`, `try_receive` and `reset` are
//!   individually atomic with respect to each other. No ordering is promised
//!   across sequences of calls.
//! - **No allocation after construction**: storage is reserved up front.
//!
//! ## Example
//!
//! ```rust
//! use pipeguard_channel::prelude::*;
//!
//! # fn main() -> Result<(), ChannelError> {
//! let channel = Channel::with_capacity(2)?;
//!
//! assert_eq!(channel.try_send(1_u64), Ok(()));
//! assert_eq!(channel.try_send(2), Ok(()));
//! assert_eq!(channel.try_send(3), Err(3));
//!
//! assert_eq!(channel.try_receive(), Some(1));
//! assert_eq!(channel.reset(), 1);
//! assert_eq!(channel.try_receive(), None);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs, missing_debug_implementations)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod channel;
pub mod error;
pub mod stats;

pub mod prelude;

pub use channel::Channel;
pub use error::{ChannelError, ChannelResult};
pub use stats::ChannelStats;
