use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;
use tracing::warn;

use super::SharedWatcherList;
use super::Watchpoint;

/// Initial state of a [`WatchpointSet`] or
/// [`InlineWatchpointSet`](super::InlineWatchpointSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialMode {
    /// Start out watched, as if someone had already called `start_watching`.
    Watching,
    /// Start out clear. The set becomes watched when the first watchpoint arrives.
    Blind,
}

/// Broadcaster for one assumption.
///
/// Moves through three states:
///
/// ```text
///   Clear ──add / start_watching──▶ Watched ──notify_write──▶ Invalidated
/// ```
///
/// `Invalidated` is terminal: every registered watchpoint has fired and the
/// list is empty. Dropping a set fires whatever is still registered, because
/// compiled code may outlive the object that owned the assumption.
///
/// Sets are single threaded (`!Send`). Embedders that mutate from several
/// threads must serialize registration and invalidation themselves.
pub struct WatchpointSet {
    watchers: Rc<SharedWatcherList>,
    pub(super) is_watched: Cell<bool>,
    pub(super) is_invalidated: Cell<bool>,
}

impl WatchpointSet {
    pub fn new(mode: InitialMode) -> Self {
        Self {
            watchers: Rc::default(),
            is_watched: Cell::new(mode == InitialMode::Watching),
            is_invalidated: Cell::new(false),
        }
    }

    pub fn is_watched(&self) -> bool {
        self.is_watched.get()
    }

    pub fn has_been_invalidated(&self) -> bool {
        self.is_invalidated.get()
    }

    pub fn is_still_valid(&self) -> bool {
        !self.has_been_invalidated()
    }

    /// Number of watchpoints that have not fired yet.
    pub fn watcher_count(&self) -> usize {
        self.watchers.borrow().len()
    }

    /// Marks the set watched without registering a watchpoint.
    pub fn start_watching(&self) {
        self.is_watched.set(true);
    }

    /// Registers `watchpoint`. `None` is ignored.
    ///
    /// Adding always leaves the set watched, even after invalidation. The
    /// late watchpoint is not fired right away; it fires on the next
    /// `notify_write` or when the set is dropped.
    ///
    /// # Panics
    /// When the watchpoint is already registered on a set.
    pub fn add<'a>(
        &self,
        watchpoint: impl Into<Option<&'a Watchpoint>>,
    ) {
        let Some(watchpoint) = watchpoint.into() else {
            return;
        };

        if self.has_been_invalidated() {
            warn!(
                source = %watchpoint.source(),
                destination = %watchpoint.destination(),
                "watchpoint added to an invalidated set, it will not fire until the next notify_write or drop"
            );
        }

        watchpoint.link_into(&self.watchers);
        self.is_watched.set(true);
    }

    /// Reports that the watched assumption no longer holds.
    ///
    /// Fires every registered watchpoint, then moves the set to the terminal
    /// invalidated state.
    ///
    /// # Panics
    /// When the set is not watched. Owners are expected to check
    /// [`WatchpointSet::is_watched`] on their write path first.
    pub fn notify_write(&self) {
        assert!(
            self.is_watched(),
            "notify_write on a watchpoint set that is not being watched"
        );

        self.fire_all_watchpoints();
        self.is_watched.set(false);
        self.is_invalidated.set(true);
    }

    /// Fires registered watchpoints until the list is empty.
    ///
    /// Watchpoints fire in registration order. Callers must not rely on it.
    /// No borrow of the list is held while a watchpoint patches code, so the
    /// patcher may drop or register other watchpoints.
    pub fn fire_all_watchpoints(&self) {
        let mut fired = 0usize;
        loop {
            let head = self.watchers.borrow().front().cloned();
            let Some(watchpoint) = head else {
                break;
            };
            watchpoint.fire();
            fired += 1;
        }

        if fired > 0 {
            debug!(fired, "watchpoint set fired all watchpoints");
        }
    }
}

impl Drop for WatchpointSet {
    fn drop(&mut self) {
        // The owner of the assumption can die before the code depending on it.
        self.fire_all_watchpoints();
    }
}

impl fmt::Debug for WatchpointSet {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("WatchpointSet")
            .field("is_watched", &self.is_watched())
            .field("is_invalidated", &self.has_been_invalidated())
            .field("watchers", &self.watcher_count())
            .finish()
    }
}
