//! Helpers shared by the integration tests: a fake executable region that
//! records patched jumps, and a code generator emitting guarded sites into it.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use deopt_watchpoints::CodeAddress;
use deopt_watchpoints::JumpPatcher;
use deopt_watchpoints::LabelOffset;
use deopt_watchpoints::LinkBuffer;
use deopt_watchpoints::LinkError;
use deopt_watchpoints::Result;
use deopt_watchpoints::Watchpoint;
use deopt_watchpoints::WatchpointRuntime;
use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static LOGGER_INIT: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

/// Executable memory stand-in: maps an instruction address to the jump
/// target installed there, and counts patches per address.
#[derive(Debug, Default)]
pub struct CodeRegion {
    jumps: RefCell<HashMap<CodeAddress, CodeAddress>>,
    patches: RefCell<HashMap<CodeAddress, usize>>,
}

impl CodeRegion {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn jump_at(
        &self,
        address: CodeAddress,
    ) -> Option<CodeAddress> {
        self.jumps.borrow().get(&address).copied()
    }

    pub fn patch_count(
        &self,
        address: CodeAddress,
    ) -> usize {
        self.patches.borrow().get(&address).copied().unwrap_or(0)
    }

    pub fn total_patches(&self) -> usize {
        self.patches.borrow().values().sum()
    }
}

impl JumpPatcher for CodeRegion {
    fn replace_with_jump(
        &self,
        source: CodeAddress,
        destination: CodeAddress,
    ) {
        self.jumps.borrow_mut().insert(source, destination);
        *self.patches.borrow_mut().entry(source).or_default() += 1;
    }
}

/// One compiled function: labels were emitted relative to `base`.
pub struct CompiledCode {
    base: usize,
    labels: u32,
}

impl CompiledCode {
    pub fn at(
        base: usize,
        labels: u32,
    ) -> Self {
        Self { base, labels }
    }

    pub fn address(
        &self,
        label: u32,
    ) -> CodeAddress {
        CodeAddress(self.base + label as usize)
    }

    /// Emits a guarded site and links it, returning the resolved watchpoint.
    pub fn guard(
        &self,
        runtime: &WatchpointRuntime,
        site: u32,
        exit: u32,
    ) -> Watchpoint {
        let watchpoint = runtime.create_watchpoint(LabelOffset(site), LabelOffset(exit));
        watchpoint.resolve_locations(self).expect("labels were emitted");
        watchpoint
    }
}

impl LinkBuffer for CompiledCode {
    fn location_of(
        &self,
        label: LabelOffset,
    ) -> Result<CodeAddress> {
        if label.0 >= self.labels {
            return Err(LinkError::UnknownLabel(label).into());
        }
        Ok(self.address(label.0))
    }
}
