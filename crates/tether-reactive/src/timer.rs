#![forbid(unsafe_code)]

//! Cancelable one-shot timers for the cooperative event loop.
//!
//! [`Timers`] is a deadline-ordered queue the host drives: effects schedule
//! callbacks with [`schedule`](Timers::schedule), the host calls
//! [`fire_due`](Timers::fire_due) from its loop. There is no background
//! thread and nothing blocks.
//!
//! # Invariants
//!
//! 1. A callback runs at most once, and only from `fire_due`.
//! 2. Cancelling (or dropping) a [`TimerHandle`] before its entry fires
//!    guarantees the callback never runs. The busy-overlay debounce depends
//!    on this: cancellation on early completion is mandatory, not
//!    best-effort.
//! 3. Due entries fire in deadline order; ties fire in schedule order.
//! 4. Callbacks may schedule new timers; those only fire on a later
//!    `fire_due` call, even if already due.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use web_time::Instant;

struct Entry {
    id: u64,
    deadline: Instant,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

struct TimersInner {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Shared handle to the timer queue. Cloning shares the queue.
#[derive(Clone)]
pub struct Timers {
    inner: Rc<RefCell<TimersInner>>,
}

impl Timers {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(TimersInner {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Schedule `callback` to run `delay` from now.
    #[must_use]
    pub fn schedule(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerHandle {
        self.schedule_at(Instant::now() + delay, callback)
    }

    /// Schedule `callback` for an absolute deadline.
    #[must_use]
    pub fn schedule_at(&self, deadline: Instant, callback: impl FnOnce() + 'static) -> TimerHandle {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(Entry {
            id,
            deadline,
            seq: id,
            callback: Box::new(callback),
        });
        TimerHandle {
            inner: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Run every callback whose deadline is at or before `now`.
    ///
    /// Returns the number of callbacks run. Entries scheduled by those
    /// callbacks wait for the next call, even if already due.
    pub fn fire_due(&self, now: Instant) -> usize {
        let mut due: Vec<Entry> = {
            let mut inner = self.inner.borrow_mut();
            let mut due = Vec::new();
            let mut remaining = Vec::with_capacity(inner.entries.len());
            for entry in inner.entries.drain(..) {
                if entry.deadline <= now {
                    due.push(entry);
                } else {
                    remaining.push(entry);
                }
            }
            inner.entries = remaining;
            due
        };
        due.sort_by_key(|e| (e.deadline, e.seq));
        let fired = due.len();
        for entry in due {
            (entry.callback)();
        }
        fired
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|e| e.deadline)
            .min()
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }
}

impl Default for Timers {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Timers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timers")
            .field("pending", &self.len())
            .finish()
    }
}

/// Guard for one scheduled callback. Cancels on drop.
pub struct TimerHandle {
    inner: Weak<RefCell<TimersInner>>,
    id: u64,
}

impl TimerHandle {
    /// Cancel the pending callback. No-op if it already fired.
    pub fn cancel(self) {
        // Drop does the work.
    }

    /// Whether the entry is still queued.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.borrow().entries.iter().any(|e| e.id == self.id))
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.borrow_mut().entries.retain(|e| e.id != self.id);
        }
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("pending", &self.is_pending())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const DELAY: Duration = Duration::from_millis(500);

    #[test]
    fn due_entry_fires_once() {
        let timers = Timers::new();
        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        let handle = timers.schedule(DELAY, move || f.set(f.get() + 1));

        let later = Instant::now() + DELAY * 2;
        assert_eq!(timers.fire_due(later), 1);
        assert_eq!(fired.get(), 1);
        assert!(!handle.is_pending());

        assert_eq!(timers.fire_due(later), 0, "one-shot: never refires");
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn not_yet_due_entry_stays_queued() {
        let timers = Timers::new();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        let _handle = timers.schedule(DELAY, move || f.set(true));

        assert_eq!(timers.fire_due(Instant::now()), 0);
        assert!(!fired.get());
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn cancel_prevents_firing() {
        let timers = Timers::new();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        let handle = timers.schedule(DELAY, move || f.set(true));

        handle.cancel();
        assert_eq!(timers.fire_due(Instant::now() + DELAY * 2), 0);
        assert!(!fired.get(), "cancelled callback must never run");
        assert!(timers.is_empty());
    }

    #[test]
    fn drop_cancels() {
        let timers = Timers::new();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        {
            let _handle = timers.schedule(DELAY, move || f.set(true));
        }
        assert_eq!(timers.fire_due(Instant::now() + DELAY * 2), 0);
        assert!(!fired.get());
    }

    #[test]
    fn fires_in_deadline_order() {
        let timers = Timers::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let now = Instant::now();

        let o1 = Rc::clone(&order);
        let _h1 = timers.schedule_at(now + Duration::from_millis(300), move || {
            o1.borrow_mut().push("late")
        });
        let o2 = Rc::clone(&order);
        let _h2 = timers.schedule_at(now + Duration::from_millis(100), move || {
            o2.borrow_mut().push("early")
        });

        timers.fire_due(now + Duration::from_millis(400));
        assert_eq!(*order.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn callback_may_reschedule() {
        let timers = Timers::new();
        let fired = Rc::new(Cell::new(0));
        let now = Instant::now();

        let inner_timers = timers.clone();
        let f = Rc::clone(&fired);
        let _h = timers.schedule_at(now, move || {
            f.set(f.get() + 1);
            let f2 = Rc::clone(&f);
            // Keep the rescheduled entry alive past this callback.
            let handle = inner_timers.schedule_at(now, move || f2.set(f2.get() + 1));
            std::mem::forget(handle);
        });

        assert_eq!(timers.fire_due(now), 1, "rescheduled entry waits");
        assert_eq!(timers.fire_due(now), 1);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn next_deadline_reports_earliest() {
        let timers = Timers::new();
        let now = Instant::now();
        let _h1 = timers.schedule_at(now + Duration::from_millis(200), || {});
        let _h2 = timers.schedule_at(now + Duration::from_millis(50), || {});

        assert_eq!(timers.next_deadline(), Some(now + Duration::from_millis(50)));
    }
}
