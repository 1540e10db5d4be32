use std::rc::Rc;

use bitflags::bitflags;
use tracing::debug;

use super::InitialMode;
use super::Watchpoint;
use super::WatchpointSet;

bitflags! {
    /// Flags kept inline while no watchpoint has been registered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct ThinFlags: u8 {
        const WATCHED = 1 << 0;
        const INVALIDATED = 1 << 1;
    }
}

impl ThinFlags {
    fn for_mode(mode: InitialMode) -> Self {
        match mode {
            InitialMode::Watching => ThinFlags::WATCHED,
            InitialMode::Blind => ThinFlags::empty(),
        }
    }

    fn of_set(set: &WatchpointSet) -> Self {
        let mut flags = ThinFlags::empty();
        flags.set(ThinFlags::WATCHED, set.is_watched());
        flags.set(ThinFlags::INVALIDATED, set.has_been_invalidated());
        flags
    }
}

#[derive(Debug)]
enum Storage {
    Thin(ThinFlags),
    Fat(Rc<WatchpointSet>),
}

/// A [`WatchpointSet`] that needs no heap allocation until someone registers
/// on it.
///
/// Most objects are never speculated on, so the set starts out *thin*: the
/// watched and invalidated flags live inline, next to the enum tag, so the
/// slot is two words wide. The first [`add`](Self::add) promotes it to a
/// *fat*, heap-allocated and reference-counted [`WatchpointSet`] that inherits
/// the flags and handles everything from then on.
#[derive(Debug)]
pub struct InlineWatchpointSet {
    storage: Storage,
}

impl InlineWatchpointSet {
    pub fn new(mode: InitialMode) -> Self {
        Self {
            storage: Storage::Thin(ThinFlags::for_mode(mode)),
        }
    }

    pub fn is_thin(&self) -> bool {
        matches!(self.storage, Storage::Thin(_))
    }

    pub fn is_fat(&self) -> bool {
        matches!(self.storage, Storage::Fat(_))
    }

    pub fn is_watched(&self) -> bool {
        match &self.storage {
            Storage::Thin(flags) => flags.contains(ThinFlags::WATCHED),
            Storage::Fat(set) => set.is_watched(),
        }
    }

    pub fn has_been_invalidated(&self) -> bool {
        match &self.storage {
            Storage::Thin(flags) => flags.contains(ThinFlags::INVALIDATED),
            Storage::Fat(set) => set.has_been_invalidated(),
        }
    }

    pub fn is_still_valid(&self) -> bool {
        !self.has_been_invalidated()
    }

    /// Marks the set watched. Stays thin.
    pub fn start_watching(&mut self) {
        match &mut self.storage {
            Storage::Thin(flags) => flags.insert(ThinFlags::WATCHED),
            Storage::Fat(set) => set.start_watching(),
        }
    }

    /// Reports a write to the watched value. Stays thin.
    ///
    /// Does nothing unless the set is watched; otherwise fires any registered
    /// watchpoints and leaves the set invalidated.
    pub fn notify_write(&mut self) {
        match &mut self.storage {
            Storage::Thin(flags) => {
                if !flags.contains(ThinFlags::WATCHED) {
                    return;
                }
                flags.remove(ThinFlags::WATCHED);
                flags.insert(ThinFlags::INVALIDATED);
            }
            Storage::Fat(set) => {
                if set.is_watched() {
                    set.notify_write();
                }
            }
        }
    }

    /// Registers `watchpoint`, promoting to a fat set first if necessary.
    pub fn add<'a>(
        &mut self,
        watchpoint: impl Into<Option<&'a Watchpoint>>,
    ) {
        self.inflate().add(watchpoint);
    }

    /// Returns the fat set, promoting if still thin.
    ///
    /// Clone the returned handle to keep the set alive independently of this slot.
    pub fn inflate(&mut self) -> &Rc<WatchpointSet> {
        if self.is_thin() {
            return self.promote();
        }
        match &self.storage {
            Storage::Fat(set) => set,
            Storage::Thin(_) => unreachable!("inline watchpoint set was just checked to be fat"),
        }
    }

    /// Replaces the inline flags with a freshly allocated [`WatchpointSet`].
    ///
    /// # Panics
    /// When the set is already fat.
    pub fn promote(&mut self) -> &Rc<WatchpointSet> {
        let Storage::Thin(flags) = self.storage else {
            panic!("inline watchpoint set is already fat");
        };

        let fat = WatchpointSet::new(InitialMode::Blind);
        if flags.contains(ThinFlags::INVALIDATED) {
            fat.is_invalidated.set(true);
        }
        if flags.contains(ThinFlags::WATCHED) {
            fat.is_watched.set(true);
        }
        debug!(?flags, "inline watchpoint set promoted");

        self.storage = Storage::Fat(Rc::new(fat));
        match &self.storage {
            Storage::Fat(set) => set,
            Storage::Thin(_) => unreachable!("inline watchpoint set was just promoted"),
        }
    }

    /// Drops this slot's reference to the fat set.
    ///
    /// The slot goes back to inline flags and a later `add` allocates a new
    /// set. If this was the last reference the set is destroyed, which fires
    /// anything still registered on it, and the slot reads as invalidated from
    /// then on. If other handles from [`inflate`](Self::inflate) are still
    /// alive the set lives on, but the slot stops tracking it and keeps the
    /// flags it had when it let go.
    ///
    /// # Panics
    /// When the set is thin.
    pub fn free_fat(&mut self) {
        let Storage::Fat(set) = &self.storage else {
            panic!("free_fat on a thin inline watchpoint set");
        };

        let shared = Rc::strong_count(set) > 1;
        let flags = if !shared && (set.is_watched() || set.watcher_count() > 0) {
            // Destroying a watched set fires it.
            ThinFlags::INVALIDATED
        } else {
            ThinFlags::of_set(set)
        };
        debug!(?flags, shared, "releasing fat inline watchpoint set");

        // Dropping the old storage may run the set's destructor.
        let previous = std::mem::replace(&mut self.storage, Storage::Thin(flags));
        drop(previous);
    }
}
