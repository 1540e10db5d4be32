//! Watchpoints, watchpoint sets and their inline, promote-on-demand form.
//!
//! ```text
//! owner object                 compiled code
//! ┌──────────────────────┐     ┌───────────────────────────────┐
//! │ InlineWatchpointSet  │     │ Watchpoint (source ─▶ dest)   │
//! │  thin: flags only    │     │ Watchpoint (source ─▶ dest)   │
//! │  fat:  Rc ───────────┼──┐  └──────────────▲────────────────┘
//! └──────────────────────┘  │                 │ fire: patch jump, unlink
//!                           ▼                 │
//!                 ┌─────────────────────────────┐
//!                 │ WatchpointSet               │
//!                 │  watchers: arena list ──────┘
//!                 │  is_watched / is_invalidated│
//!                 └─────────────────────────────┘
//! ```
//!
//! A watchpoint is owned by whoever created it and only *linked* into a set.
//! The set keeps a strong handle to each linked watchpoint so it can fire
//! it; the watchpoint keeps a weak handle back to the list so it can unlink
//! itself when its owner drops it first.
//!
//! # Usage Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use deopt_watchpoints::{InitialMode, InlineWatchpointSet, LabelOffset, Watchpoint};
//!
//! let mut structure_transition = InlineWatchpointSet::new(InitialMode::Blind);
//!
//! let watchpoint = Watchpoint::new(LabelOffset(16), LabelOffset(96), patcher);
//! watchpoint.resolve_locations(&link_buffer)?;
//! structure_transition.add(&watchpoint);
//!
//! // The structure is about to change: every compiled site bails out.
//! structure_transition.notify_write();
//! assert!(structure_transition.has_been_invalidated());
//! ```

mod inline_set;
mod list;
mod node;
mod set;


use std::cell::RefCell;

pub use inline_set::*;
pub use node::*;
pub use set::*;

use list::WatcherList;

pub(crate) type SharedWatcherList = RefCell<WatcherList<std::rc::Rc<WatchpointInner>>>;
