//! Invalidation watchpoints for speculative JIT code.
//!
//! Compiled code that relies on an assumption ("this object's layout does not
//! change") registers a [`Watchpoint`] on the [`WatchpointSet`] guarding that
//! assumption. When the assumption breaks, the owner calls
//! [`WatchpointSet::notify_write`] and every registered watchpoint patches its
//! code site exactly once, redirecting execution to a deoptimization target.
//!
//! Objects that are rarely watched embed an [`InlineWatchpointSet`], which
//! keeps two flags inline and only allocates a full set for its first
//! watchpoint.
//!
//! The machine-code side is injected through [`LinkBuffer`] and
//! [`JumpPatcher`]; this crate never encodes instructions itself.

mod code;
mod config;
mod errors;
mod runtime;
mod watchpoint;

pub use code::*;
pub use config::*;
pub use errors::*;
pub use runtime::*;
pub use watchpoint::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
