//! Code locations and the code-generator capabilities the watchpoints consume.
//!
//! The watchpoint core never encodes machine code itself. It only needs to
//! turn label offsets into addresses once emission is final ([`LinkBuffer`])
//! and to redirect one instruction to another ([`JumpPatcher`]). Both are
//! injected so the core can be exercised with a recorder instead of live code.

mod location;
pub use location::*;


#[cfg(test)]
use mockall::automock;

use crate::Result;

/// Patch context handed out by the code generator after final code layout.
#[cfg_attr(test, automock)]
pub trait LinkBuffer {
    /// Returns the runtime address of the instruction behind `label`.
    ///
    /// # Errors
    /// `LinkError::UnknownLabel` when the label was not emitted into this buffer.
    fn location_of(
        &self,
        label: LabelOffset,
    ) -> Result<CodeAddress>;
}

/// Redirects live machine code.
#[cfg_attr(test, automock)]
pub trait JumpPatcher {
    /// Overwrite the instruction at `source` with a jump to `destination`.
    fn replace_with_jump(
        &self,
        source: CodeAddress,
        destination: CodeAddress,
    );
}
