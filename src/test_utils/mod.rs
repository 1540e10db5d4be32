//! Shared helpers for unit tests: a patcher that records every redirect,
//! a link buffer backed by a label table, and one-time logger setup.
mod common;
mod recording;

pub use common::*;
pub use recording::*;
