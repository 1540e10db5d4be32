//! Watchpoint Error Hierarchy
//!
//! Only conditions an embedder can recover from are modelled here. Breaking
//! the invalidation protocol itself (firing an unresolved watchpoint,
//! notifying a set nobody watches, promoting an inline set twice) is a
//! programming error and aborts via assertion instead.

use config::ConfigError;

use crate::CodeAddress;
use crate::LabelOffset;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Code-location resolution failures
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Configuration loading failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration validation failures
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LinkError {
    /// The link buffer does not know the label
    #[error("Label {0} is not part of the finalized code")]
    UnknownLabel(LabelOffset),

    /// Label offsets were already replaced by addresses
    #[error("Watchpoint locations were already resolved")]
    AlreadyResolved,

    /// Source and destination resolve to the same instruction
    #[error("Watchpoint would redirect {0} onto itself")]
    SelfLoop(CodeAddress),

    /// The jump cannot be encoded over this distance
    #[error("Jump from {from} to {to} exceeds {limit} bytes")]
    JumpOutOfRange {
        from: CodeAddress,
        to: CodeAddress,
        limit: u64,
    },
}
