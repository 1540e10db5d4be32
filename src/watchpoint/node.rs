use std::cell::Cell;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::rc::Weak;

use tracing::debug;
use tracing::trace;

use super::list::ListKey;
use super::SharedWatcherList;
use super::WatchpointSet;
use crate::runtime::FireContext;
use crate::CodeAddress;
use crate::CodeLocation;
use crate::JumpPatcher;
use crate::LabelOffset;
use crate::LinkBuffer;
use crate::LinkError;
use crate::Result;
use crate::WatchpointConfig;

/// Where a registered watchpoint currently lives.
///
/// The list is only weakly referenced: a set never outlives its list, and a
/// watchpoint must not keep a dead set's list alive.
#[derive(Debug)]
struct Membership {
    list: Weak<SharedWatcherList>,
    key: ListKey,
}

pub(crate) struct WatchpointInner {
    source: Cell<CodeLocation>,
    destination: Cell<CodeLocation>,
    membership: RefCell<Option<Membership>>,
    context: Rc<FireContext>,
}

impl WatchpointInner {
    pub(crate) fn is_on_list(&self) -> bool {
        self.membership.borrow().is_some()
    }

    /// Patches the jump, then leaves whatever list this watchpoint is on.
    ///
    /// # Panics
    /// When the locations were never resolved. Jumping through a label offset
    /// would patch an arbitrary address.
    pub(crate) fn fire(&self) {
        let (Some(source), Some(destination)) =
            (self.source.get().address(), self.destination.get().address())
        else {
            panic!(
                "watchpoint {} -> {} fired before its code locations were resolved",
                self.source.get(),
                self.destination.get()
            );
        };

        if self.context.config().firing.trace_redirects {
            trace!(%source, %destination, "redirecting watchpoint");
        }
        self.context.patcher().replace_with_jump(source, destination);
        self.context.stats().record_redirect();

        self.unlink();
    }

    /// Leaves the current list, if any. Never fires.
    fn unlink(&self) {
        let Some(membership) = self.membership.borrow_mut().take() else {
            return;
        };
        if let Some(list) = membership.list.upgrade() {
            // Bind the removed handle so it is released after the list borrow.
            let removed = list.borrow_mut().remove(membership.key);
            drop(removed);
        }
    }
}

/// A compiled code site waiting to be told that its assumption broke.
///
/// Holds two code locations: the instruction to overwrite (`source`) and the
/// jump target to install there (`destination`), usually an OSR exit or a
/// deoptimization stub. Both start as label offsets and must be resolved with
/// [`Watchpoint::resolve_locations`] once code emission is final.
///
/// A watchpoint belongs to its creator. Dropping it while it is registered
/// simply leaves the set without patching anything.
pub struct Watchpoint {
    inner: Rc<WatchpointInner>,
}

impl Watchpoint {
    /// Creates an unresolved watchpoint using the default configuration.
    pub fn new(
        source: LabelOffset,
        destination: LabelOffset,
        patcher: Rc<dyn JumpPatcher>,
    ) -> Self {
        let context = FireContext::new(patcher, WatchpointConfig::default());
        Self::with_context(source, destination, Rc::new(context))
    }

    pub(crate) fn with_context(
        source: LabelOffset,
        destination: LabelOffset,
        context: Rc<FireContext>,
    ) -> Self {
        context.stats().record_created();
        Self {
            inner: Rc::new(WatchpointInner {
                source: Cell::new(CodeLocation::Label(source)),
                destination: Cell::new(CodeLocation::Label(destination)),
                membership: RefCell::new(None),
                context,
            }),
        }
    }

    pub fn source(&self) -> CodeLocation {
        self.inner.source.get()
    }

    pub fn destination(&self) -> CodeLocation {
        self.inner.destination.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.source.get().is_resolved() && self.inner.destination.get().is_resolved()
    }

    /// Both resolved addresses as `(source, destination)`.
    pub fn addresses(&self) -> Option<(CodeAddress, CodeAddress)> {
        Some((
            self.inner.source.get().address()?,
            self.inner.destination.get().address()?,
        ))
    }

    pub fn is_on_list(&self) -> bool {
        self.inner.is_on_list()
    }

    /// Converts both label offsets into runtime addresses.
    ///
    /// Must run after the owning code has been linked and before anything can
    /// fire this watchpoint. The watchpoint is left untouched on error.
    ///
    /// # Errors
    /// - `LinkError::AlreadyResolved` when called a second time
    /// - `LinkError::UnknownLabel` from the link buffer
    /// - `LinkError::SelfLoop` / `LinkError::JumpOutOfRange` when the resolved
    ///   jump breaks the configured linking rules
    pub fn resolve_locations(
        &self,
        link_buffer: &dyn LinkBuffer,
    ) -> Result<()> {
        let (Some(source_label), Some(destination_label)) =
            (self.inner.source.get().label(), self.inner.destination.get().label())
        else {
            return Err(LinkError::AlreadyResolved.into());
        };

        let source = link_buffer.location_of(source_label)?;
        let destination = link_buffer.location_of(destination_label)?;
        self.inner.context.config().linking.check_jump(source, destination)?;

        self.inner.source.set(CodeLocation::Address(source));
        self.inner.destination.set(CodeLocation::Address(destination));
        self.inner.context.stats().record_resolution();

        debug!(
            %source_label,
            %destination_label,
            %source,
            %destination,
            "watchpoint locations resolved"
        );
        Ok(())
    }

    /// Registers this watchpoint on `set`. Same as `set.add(self)`.
    pub fn register_on(
        &self,
        set: &WatchpointSet,
    ) {
        set.add(self);
    }

    /// Redirects `source` to `destination` and leaves the set it is on.
    ///
    /// # Panics
    /// When [`Watchpoint::resolve_locations`] has not succeeded yet.
    pub fn fire(&self) {
        self.inner.fire();
    }

    /// Links this watchpoint at the end of `list`.
    ///
    /// # Panics
    /// When the watchpoint is already registered on a set.
    pub(crate) fn link_into(
        &self,
        list: &Rc<SharedWatcherList>,
    ) {
        let mut membership = self.inner.membership.borrow_mut();
        assert!(
            membership.is_none(),
            "watchpoint {} -> {} is already registered on a watchpoint set",
            self.inner.source.get(),
            self.inner.destination.get()
        );

        let key = list.borrow_mut().push_back(Rc::clone(&self.inner));
        *membership = Some(Membership {
            list: Rc::downgrade(list),
            key,
        });
    }
}

impl Drop for Watchpoint {
    fn drop(&mut self) {
        if self.inner.is_on_list() {
            trace!(
                source = %self.inner.source.get(),
                destination = %self.inner.destination.get(),
                "watchpoint dropped while registered, unlinking without firing"
            );
            self.inner.unlink();
        }
    }
}

impl fmt::Debug for Watchpoint {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Watchpoint")
            .field("source", &self.inner.source.get())
            .field("destination", &self.inner.destination.get())
            .field("on_list", &self.inner.is_on_list())
            .finish()
    }
}
