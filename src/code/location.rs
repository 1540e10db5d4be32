use std::fmt;

/// Offset of a label in code that is still being emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelOffset(pub u32);

impl fmt::Display for LabelOffset {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "label+{}", self.0)
    }
}

/// Concrete address of an instruction in executable memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodeAddress(pub usize);

impl fmt::Display for CodeAddress {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Where a watchpoint jumps from or to.
///
/// Starts out as a label and becomes an address exactly once, when the
/// owning code is linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLocation {
    Label(LabelOffset),
    Address(CodeAddress),
}

impl CodeLocation {
    pub fn address(&self) -> Option<CodeAddress> {
        match self {
            CodeLocation::Address(address) => Some(*address),
            CodeLocation::Label(_) => None,
        }
    }

    pub fn label(&self) -> Option<LabelOffset> {
        match self {
            CodeLocation::Label(label) => Some(*label),
            CodeLocation::Address(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, CodeLocation::Address(_))
    }
}

impl From<LabelOffset> for CodeLocation {
    fn from(label: LabelOffset) -> Self {
        CodeLocation::Label(label)
    }
}

impl fmt::Display for CodeLocation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            CodeLocation::Label(label) => label.fmt(f),
            CodeLocation::Address(address) => address.fmt(f),
        }
    }
}
