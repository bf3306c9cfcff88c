#![forbid(unsafe_code)]

//! Coalescing render scheduler.
//!
//! Event callbacks mutate cells synchronously; mounts respond by marking
//! themselves dirty here instead of re-rendering inline. The host calls
//! [`RenderScheduler::flush`] after each callback returns, at which point
//! every dirty mount renders exactly once. N writes inside one callback
//! cost one render pass per affected mount, and observers never see a torn
//! intermediate state.
//!
//! Marks made *during* a flush (a render writing a cell) land in the next
//! flush, never the current one.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

struct SchedulerInner {
    next_id: u64,
    // Weak render-pass thunks; the strong half lives in the Mount.
    targets: Vec<(u64, Weak<dyn Fn()>)>,
    dirty: Vec<u64>,
}

/// Shared handle to the scheduler. Cloning shares the queue.
#[derive(Clone)]
pub struct RenderScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl RenderScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                next_id: 0,
                targets: Vec::new(),
                dirty: Vec::new(),
            })),
        }
    }

    /// Register a render-pass thunk; returns the mount id used for dirty
    /// marks. The scheduler holds the thunk weakly.
    pub(crate) fn register(&self, target: &Rc<dyn Fn()>) -> u64 {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.targets.push((id, Rc::downgrade(target)));
        id
    }

    pub(crate) fn unregister(&self, id: u64) {
        let mut inner = self.inner.borrow_mut();
        inner.targets.retain(|(tid, _)| *tid != id);
        inner.dirty.retain(|did| *did != id);
    }

    /// Mark a mount dirty. Duplicate marks before the next flush coalesce.
    pub(crate) fn mark_dirty(&self, id: u64) {
        let mut inner = self.inner.borrow_mut();
        if !inner.dirty.contains(&id) {
            inner.dirty.push(id);
        }
    }

    /// Render every mount marked dirty since the previous flush.
    ///
    /// Returns the number of render passes run. Each mount renders at most
    /// once per flush; marks made by those renders queue for the next call.
    pub fn flush(&self) -> usize {
        let due: Vec<Rc<dyn Fn()>> = {
            let mut inner = self.inner.borrow_mut();
            let dirty = std::mem::take(&mut inner.dirty);
            dirty
                .into_iter()
                .filter_map(|id| {
                    inner
                        .targets
                        .iter()
                        .find(|(tid, _)| *tid == id)
                        .and_then(|(_, weak)| weak.upgrade())
                })
                .collect()
        };
        let passes = due.len();
        if passes > 0 {
            tracing::trace!(passes, "render flush");
        }
        for render in due {
            render();
        }
        passes
    }

    /// Whether any mount is waiting for the next flush.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().dirty.is_empty()
    }
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("RenderScheduler")
            .field("targets", &inner.targets.len())
            .field("dirty", &inner.dirty.len())
            .finish()
    }
}
