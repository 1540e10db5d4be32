use std::cell::Cell;

/// Counters of a [`WatchpointRuntime`](super::WatchpointRuntime) at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FireStats {
    /// Watchpoints handed out
    pub watchpoints_created: u64,
    /// Watchpoints whose labels were resolved to addresses
    pub resolutions: u64,
    /// Jumps patched by firing watchpoints
    pub redirects: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatCounters {
    watchpoints_created: Cell<u64>,
    resolutions: Cell<u64>,
    redirects: Cell<u64>,
}

impl StatCounters {
    pub(crate) fn record_created(&self) {
        bump(&self.watchpoints_created);
    }

    pub(crate) fn record_resolution(&self) {
        bump(&self.resolutions);
    }

    pub(crate) fn record_redirect(&self) {
        bump(&self.redirects);
    }

    pub(crate) fn snapshot(&self) -> FireStats {
        FireStats {
            watchpoints_created: self.watchpoints_created.get(),
            resolutions: self.resolutions.get(),
            redirects: self.redirects.get(),
        }
    }
}

fn bump(counter: &Cell<u64>) {
    counter.set(counter.get().saturating_add(1));
}
