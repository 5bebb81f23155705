//! Prelude for pipeguard-channel.
//!
//! ```rust
//! use pipeguard_channel::prelude::*;
//!
//! # fn main() -> Result<(), ChannelError> {
//! let channel: Channel<u64> = Channel::with_capacity(10)?;
//! assert_eq!(channel.stats(), ChannelStats::default());
//! # Ok(())
//! # }
//! ```

pub use crate::channel::Channel;
pub use crate::error::{ChannelError, ChannelResult};
pub use crate::stats::ChannelStats;
