#![forbid(unsafe_code)]

//! Per-render dependency tracking.
//!
//! A tracking frame records every [`Observable`](crate::observable::Observable)
//! read that happens while it is active. [`Mount`](crate::component::Mount)
//! wraps each render pass in a frame, then diffs the recorded read set
//! against the previous pass to subscribe/unsubscribe exactly the delta.
//!
//! Frames nest: a read is recorded only into the innermost active frame, so
//! a mount rendering inside another mount's render pass does not pollute the
//! outer read set. Reads outside any frame are not recorded at all.

use std::cell::RefCell;
use std::rc::Rc;

use crate::observable::Subscription;

/// Identity of a cell, unique per cell allocation within a thread.
pub(crate) type CellId = u64;

/// One recorded read: the cell's identity plus a type-erased way to
/// subscribe a change callback to it.
pub(crate) struct TrackedRead {
    pub(crate) key: CellId,
    pub(crate) subscribe: Box<dyn Fn(Rc<dyn Fn()>) -> Subscription>,
}

thread_local! {
    static FRAMES: RefCell<Vec<Vec<TrackedRead>>> = const { RefCell::new(Vec::new()) };
    static NEXT_CELL_ID: RefCell<CellId> = const { RefCell::new(0) };
}

/// Allocate a fresh cell identity.
pub(crate) fn next_cell_id() -> CellId {
    NEXT_CELL_ID.with(|n| {
        let mut n = n.borrow_mut();
        let id = *n;
        *n += 1;
        id
    })
}

/// Whether a tracking frame is currently active on this thread.
pub(crate) fn is_active() -> bool {
    FRAMES.with(|f| !f.borrow().is_empty())
}

/// Record a read into the innermost active frame. Duplicate reads of the
/// same cell within one frame collapse to the first record.
pub(crate) fn record(read: TrackedRead) {
    FRAMES.with(|f| {
        let mut frames = f.borrow_mut();
        if let Some(top) = frames.last_mut() {
            if !top.iter().any(|r| r.key == read.key) {
                top.push(read);
            }
        }
    });
}

/// Run `f` inside a fresh tracking frame and return its result together
/// with the ordered set of cells it read.
pub(crate) fn tracked<R>(f: impl FnOnce() -> R) -> (R, Vec<TrackedRead>) {
    FRAMES.with(|frames| frames.borrow_mut().push(Vec::new()));
    let result = f();
    let reads = FRAMES.with(|frames| {
        frames
            .borrow_mut()
            .pop()
            .unwrap_or_default()
    });
    (result, reads)
}
