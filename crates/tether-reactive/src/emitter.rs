#![forbid(unsafe_code)]

//! Always-notify event channels.
//!
//! [`Emitter<T>`] is the discrete-event sibling of
//! [`Observable`](crate::Observable): `emit` notifies every subscriber on
//! every call, with no equality suppression and no retained value. Use it
//! for things that are *events*, not *state* (a hash change, a link click),
//! where emitting the same payload twice must fire twice.
//!
//! Emits are never recorded as render dependencies.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::observable::Subscription;

struct Inner<T> {
    next_sub_id: u64,
    subscribers: Vec<(u64, Weak<dyn Fn(&T)>)>,
}

/// A shared event channel. Cloning shares the subscriber list.
pub struct Emitter<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T> Emitter<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                next_sub_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Notify every live subscriber with `event`, in registration order.
    pub fn emit(&self, event: T) {
        let to_call: Vec<Rc<dyn Fn(&T)>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|(_, weak)| weak.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(|(_, weak)| weak.upgrade())
                .collect()
        };
        for callback in to_call {
            callback(&event);
        }
    }

    /// Register `callback` for every future emit. Dropping the returned
    /// guard unsubscribes.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription
    where
        T: 'static,
    {
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
            let _keep_alive = &callback;
            if let Some(inner) = weak_inner.upgrade() {
                inner.borrow_mut().subscribers.retain(|(sid, _)| *sid != id);
            }
        })
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
}
