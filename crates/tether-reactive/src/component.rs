#![forbid(unsafe_code)]

//! Bonded components: render units with dependency-tracked re-rendering
//! and an exactly-once init/dispose lifecycle.
//!
//! A [`Component`] owns its domain cells and exposes a pure `render`. A
//! [`Mount`] binds one component instance to a mount point: it runs each
//! render inside a tracking frame, subscribes to exactly the set of cells
//! the render read, and re-renders, coalesced through the
//! [`RenderScheduler`](crate::RenderScheduler), whenever any of them
//! changes.
//!
//! # Lifecycle
//!
//! 1. Mount: one render, output committed to the sink, then `init`, once.
//! 2. Tracked cell changes mark the mount dirty; the next scheduler flush
//!    re-renders it once no matter how many cells changed.
//! 3. Every render re-tracks reads and diffs against the previous pass:
//!    cells no longer read are unsubscribed, newly read cells subscribed.
//!    Stale subscriptions never accumulate.
//! 4. Unmount (or drop): `dispose` runs exactly once, even under rapid
//!    remount, then every subscription the mount owns is released.
//!
//! The mount exclusively owns the subscription-tracking metadata; the
//! component owns its cells.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::observable::Subscription;
use crate::scheduler::RenderScheduler;
use crate::track::{self, CellId};

/// A render unit. `init` and `dispose` default to no-ops.
pub trait Component {
    /// The node type this component commits to the display tree.
    type Output;

    /// Produce the current output. Must be a pure read of cells; cell
    /// reads made here become the mount's dependency set.
    fn render(&self) -> Self::Output;

    /// Runs exactly once, after the first output is committed.
    fn init(&mut self) {}

    /// Runs exactly once, at unmount. Must release every external
    /// listener the component registered.
    fn dispose(&mut self) {}
}

struct MountCore<C: Component> {
    component: C,
    sink: Box<dyn Fn(&C::Output)>,
    deps: Vec<(CellId, Subscription)>,
}

/// A component bound to a mount point.
///
/// Dropping the mount unmounts it (dispose runs, subscriptions released);
/// [`Mount::unmount`] does the same explicitly.
pub struct Mount<C: Component> {
    core: Rc<RefCell<MountCore<C>>>,
    // Strong half of the scheduler's weak render target; never read, only
    // kept alive so flush() can upgrade it.
    _render_thunk: Rc<dyn Fn()>,
    scheduler: RenderScheduler,
    id: u64,
    torn_down: Cell<bool>,
}

impl<C: Component + 'static> Mount<C> {
    /// Mount `component`, committing each render's output to `sink`.
    ///
    /// Runs the first render synchronously, then `init`.
    pub fn new(
        component: C,
        scheduler: &RenderScheduler,
        sink: impl Fn(&C::Output) + 'static,
    ) -> Self {
        let core = Rc::new(RefCell::new(MountCore {
            component,
            sink: Box::new(sink),
            deps: Vec::new(),
        }));

        // The thunk needs its own id, which registration assigns; the slot
        // is filled before anything can mark the mount dirty.
        let id_slot = Rc::new(Cell::new(0u64));
        let thunk_core = Rc::clone(&core);
        let thunk_sched = scheduler.clone();
        let thunk_id = Rc::clone(&id_slot);
        let render_thunk: Rc<dyn Fn()> = Rc::new(move || {
            render_pass(&thunk_core, &thunk_sched, thunk_id.get());
        });
        let id = scheduler.register(&render_thunk);
        id_slot.set(id);

        render_pass(&core, scheduler, id);
        core.borrow_mut().component.init();

        Self {
            core,
            _render_thunk: render_thunk,
            scheduler: scheduler.clone(),
            id,
            torn_down: Cell::new(false),
        }
    }

    /// Unmount: dispose the component and release all subscriptions.
    pub fn unmount(self) {
        // Teardown happens in Drop; consuming `self` just makes the intent
        // explicit at call sites.
        drop(self);
    }

}

impl<C: Component> Mount<C> {
    /// Read access to the mounted component.
    pub fn with_component<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&self.core.borrow().component)
    }

    /// Number of cells the most recent render subscribed to.
    #[must_use]
    pub fn dependency_count(&self) -> usize {
        self.core.borrow().deps.len()
    }

    fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        self.scheduler.unregister(self.id);
        let mut core = self.core.borrow_mut();
        core.component.dispose();
        core.deps.clear();
    }
}

impl<C: Component> Drop for Mount<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn render_pass<C: Component>(
    core: &Rc<RefCell<MountCore<C>>>,
    scheduler: &RenderScheduler,
    id: u64,
) {
    let (output, reads) = track::tracked(|| core.borrow().component.render());

    {
        let mut c = core.borrow_mut();
        let mut next: Vec<(CellId, Subscription)> = Vec::with_capacity(reads.len());
        for read in reads {
            if let Some(pos) = c.deps.iter().position(|(key, _)| *key == read.key) {
                // Still read: keep the existing subscription.
                next.push(c.deps.swap_remove(pos));
            } else {
                let sched = scheduler.clone();
                let sub = (read.subscribe)(Rc::new(move || sched.mark_dirty(id)));
                next.push((read.key, sub));
            }
        }
        // Whatever is left was read last pass but not this one.
        c.deps = next;
    }

    let c = core.borrow();
    (c.sink)(&output);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
