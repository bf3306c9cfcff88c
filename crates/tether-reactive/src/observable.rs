#![forbid(unsafe_code)]

//! Shared, version-tracked value cells with change notification.
//!
//! [`Observable<T>`] is the fundamental unit of state: a single mutable
//! value that notifies subscribers when it changes. Cloning an `Observable`
//! creates a new handle to the **same** cell.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified synchronously, in registration order, after
//!    the value has been replaced.
//! 3. Setting a value equal to the current value (`PartialEq`) is a no-op:
//!    no version bump, no notifications.
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 5. Writes are always accepted; there is no validation layer.
//!
//! # Failure Modes
//!
//! - **Subscriber panics**: propagates to the writer; remaining subscribers
//!   in this cycle are skipped. The value itself is already committed.
//! - **Re-entrant write from a subscriber**: allowed. The nested write runs
//!   a full notification cycle of its own before the outer cycle resumes
//!   with the stale snapshot it already captured.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::track::{self, TrackedRead};

struct Inner<T> {
    value: T,
    version: u64,
    next_sub_id: u64,
    // Weak callbacks; the strong half lives in the Subscription guard.
    // Dead entries are pruned lazily during notification.
    subscribers: Vec<(u64, Weak<dyn Fn(&T)>)>,
}

/// A shared observable value cell.
///
/// Reads performed during a render pass are recorded by the dependency
/// tracker so the owning [`Mount`](crate::component::Mount) can subscribe to
/// exactly the cells the render actually touched.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
    id: u64,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            id: self.id,
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a new cell holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value: initial,
                version: 0,
                next_sub_id: 0,
                subscribers: Vec::new(),
            })),
            id: track::next_cell_id(),
        }
    }

    /// Read the current value.
    ///
    /// Recorded as a dependency when called inside a render pass.
    #[must_use]
    pub fn get(&self) -> T {
        self.record_read();
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    ///
    /// Recorded as a dependency when called inside a render pass.
    ///
    /// # Panics
    ///
    /// Panics if the closure writes back into the same cell (re-entrant
    /// borrow).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.record_read();
        f(&self.inner.borrow().value)
    }

    /// Replace the value.
    ///
    /// If `value` equals the current value this is a no-op. Otherwise the
    /// value is committed, the version bumped, and every live subscriber is
    /// invoked synchronously, in registration order, with the new value.
    pub fn set(&self, value: T) {
        let to_call: Vec<Rc<dyn Fn(&T)>> = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
            inner.subscribers.retain(|(_, weak)| weak.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(|(_, weak)| weak.upgrade())
                .collect()
        };
        // Snapshot outside the borrow so subscribers may freely read or
        // even write this cell.
        let snapshot = self.inner.borrow().value.clone();
        for callback in to_call {
            callback(&snapshot);
        }
    }

    /// Register `callback` to run on every future change.
    ///
    /// The returned [`Subscription`] keeps the callback alive; dropping it
    /// unsubscribes. The callback is **not** invoked with the current value.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<dyn Fn(&T)> = Rc::new(callback);
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_sub_id;
            inner.next_sub_id += 1;
            inner.subscribers.push((id, Rc::downgrade(&callback)));
            id
        };
        let weak_inner = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            // The strong callback is dropped with this closure; removing the
            // registry entry keeps the subscriber list tidy eagerly.
            let _keep_alive = &callback;
            if let Some(inner) = weak_inner.upgrade() {
                inner.borrow_mut().subscribers.retain(|(sid, _)| *sid != id);
            }
        })
    }

    /// Monotonic version counter; bumped once per value-changing write.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }

    fn record_read(&self) {
        if track::is_active() {
            let this = self.clone();
            track::record(TrackedRead {
                key: self.id,
                subscribe: Box::new(move |notify: Rc<dyn Fn()>| {
                    this.subscribe(move |_| notify())
                }),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Subscription — RAII unsubscribe guard
// ---------------------------------------------------------------------------

/// RAII guard for a registered callback.
///
/// Holds the only strong reference to the callback; dropping the guard
/// removes the callback before the next notification cycle. Type-erased so
/// guards over differently-typed cells (and [`Emitter`](crate::Emitter)s)
/// can live in one collection.
pub struct Subscription {
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self {
            cleanup: Some(Box::new(cleanup)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
