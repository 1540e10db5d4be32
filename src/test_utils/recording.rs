use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::CodeAddress;
use crate::InitialMode;
use crate::JumpPatcher;
use crate::LabelOffset;
use crate::LinkBuffer;
use crate::LinkError;
use crate::Result;
use crate::Watchpoint;

/// Patcher that remembers every `(source, destination)` jump it installed.
#[derive(Debug, Default)]
pub struct RecordingPatcher {
    redirects: RefCell<Vec<(CodeAddress, CodeAddress)>>,
}

impl RecordingPatcher {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn redirects(&self) -> Vec<(CodeAddress, CodeAddress)> {
        self.redirects.borrow().clone()
    }

    pub fn redirect_count(&self) -> usize {
        self.redirects.borrow().len()
    }

    /// How often the jump at `source` was patched.
    pub fn times_patched(
        &self,
        source: CodeAddress,
    ) -> usize {
        self.redirects.borrow().iter().filter(|(from, _)| *from == source).count()
    }
}

impl JumpPatcher for RecordingPatcher {
    fn replace_with_jump(
        &self,
        source: CodeAddress,
        destination: CodeAddress,
    ) {
        self.redirects.borrow_mut().push((source, destination));
    }
}

/// Link buffer mapping every label offset to `base + offset`.
#[derive(Debug)]
pub struct OffsetLinkBuffer {
    base: usize,
    size: u32,
}

impl OffsetLinkBuffer {
    pub fn new(
        base: usize,
        size: u32,
    ) -> Self {
        Self { base, size }
    }
}

impl LinkBuffer for OffsetLinkBuffer {
    fn location_of(
        &self,
        label: LabelOffset,
    ) -> Result<CodeAddress> {
        if label.0 >= self.size {
            return Err(LinkError::UnknownLabel(label).into());
        }
        Ok(CodeAddress(self.base + label.0 as usize))
    }
}

/// Link buffer with an explicit label table.
#[derive(Debug, Default)]
pub struct TableLinkBuffer {
    labels: HashMap<LabelOffset, CodeAddress>,
}

impl TableLinkBuffer {
    pub fn with(
        mut self,
        label: u32,
        address: usize,
    ) -> Self {
        self.labels.insert(LabelOffset(label), CodeAddress(address));
        self
    }
}

impl LinkBuffer for TableLinkBuffer {
    fn location_of(
        &self,
        label: LabelOffset,
    ) -> Result<CodeAddress> {
        self.labels.get(&label).copied().ok_or_else(|| LinkError::UnknownLabel(label).into())
    }
}

pub const CODE_BASE: usize = 0x1000;

pub fn code_buffer() -> OffsetLinkBuffer {
    OffsetLinkBuffer::new(CODE_BASE, 4096)
}

/// Creates a watchpoint resolved against [`code_buffer`].
pub fn resolved_watchpoint(
    patcher: &Rc<RecordingPatcher>,
    source: u32,
    destination: u32,
) -> Watchpoint {
    let watchpoint =
        Watchpoint::new(LabelOffset(source), LabelOffset(destination), patcher.clone());
    watchpoint
        .resolve_locations(&code_buffer())
        .expect("test labels fall inside the code buffer");
    watchpoint
}

pub fn address(label: u32) -> CodeAddress {
    CodeAddress(CODE_BASE + label as usize)
}

pub fn all_modes() -> [InitialMode; 2] {
    [InitialMode::Watching, InitialMode::Blind]
}
