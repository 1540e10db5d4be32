//! Entry point for a code generator that hands out watchpoints.
//!
//! A [`WatchpointRuntime`] owns the jump patcher and the configuration and
//! shares them with every watchpoint it creates, together with a few
//! counters describing what the watchpoints did.

mod stats;
pub use stats::*;

#[cfg(test)]
mod runtime_test;

use std::fmt;
use std::rc::Rc;

use tracing::info;

use crate::InitialMode;
use crate::InlineWatchpointSet;
use crate::JumpPatcher;
use crate::LabelOffset;
use crate::Result;
use crate::Watchpoint;
use crate::WatchpointConfig;
use crate::WatchpointSet;

/// State shared by a runtime and all of its watchpoints.
pub(crate) struct FireContext {
    patcher: Rc<dyn JumpPatcher>,
    config: WatchpointConfig,
    stats: StatCounters,
}

impl FireContext {
    pub(crate) fn new(
        patcher: Rc<dyn JumpPatcher>,
        config: WatchpointConfig,
    ) -> Self {
        Self {
            patcher,
            config,
            stats: StatCounters::default(),
        }
    }

    pub(crate) fn patcher(&self) -> &dyn JumpPatcher {
        self.patcher.as_ref()
    }

    pub(crate) fn config(&self) -> &WatchpointConfig {
        &self.config
    }

    pub(crate) fn stats(&self) -> &StatCounters {
        &self.stats
    }
}

pub struct WatchpointRuntime {
    context: Rc<FireContext>,
}

impl WatchpointRuntime {
    /// Validates `config` and builds a runtime patching code through `patcher`.
    pub fn new(
        patcher: Rc<dyn JumpPatcher>,
        config: WatchpointConfig,
    ) -> Result<Self> {
        let config = config.validate()?;
        info!(?config, "watchpoint runtime initialized");
        Ok(Self {
            context: Rc::new(FireContext::new(patcher, config)),
        })
    }

    /// Creates an unresolved watchpoint from `source` to `destination`.
    pub fn create_watchpoint(
        &self,
        source: LabelOffset,
        destination: LabelOffset,
    ) -> Watchpoint {
        Watchpoint::with_context(source, destination, Rc::clone(&self.context))
    }

    pub fn new_set(
        &self,
        mode: InitialMode,
    ) -> WatchpointSet {
        WatchpointSet::new(mode)
    }

    pub fn new_inline_set(
        &self,
        mode: InitialMode,
    ) -> InlineWatchpointSet {
        InlineWatchpointSet::new(mode)
    }

    pub fn config(&self) -> &WatchpointConfig {
        self.context.config()
    }

    pub fn stats(&self) -> FireStats {
        self.context.stats().snapshot()
    }
}

impl fmt::Debug for WatchpointRuntime {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("WatchpointRuntime")
            .field("config", self.context.config())
            .field("stats", &self.stats())
            .finish()
    }
}
