//! Prelude for pipeguard-flags.

pub use crate::error::{FlagError, FlagResult};
pub use crate::flag_set::{FlagDrain, FlagSet};
pub use crate::flags::StatusFlags;
