#![forbid(unsafe_code)]

//! Debounced busy overlay.
//!
//! Two booleans, one rule: `busy` mirrors the client's outstanding
//! round-trip; `spin` goes true only if `busy` survives the debounce
//! window, and false the instant `busy` clears, even mid-window. Fast
//! requests never flash the spinner; slow requests always drop it
//! immediately on completion.
//!
//! The debounce is a standing subscription on the busy cell plus a
//! cancelable timer, deliberately outside the render lifecycle: it must
//! run whether or not the overlay is currently rendering.
//!
//! Transitions:
//!
//! - `busy: false → true`: schedule the spin timer; `spin` stays false.
//! - timer fires while `busy` still true: `spin = true`.
//! - `busy: true → false`: cancel any pending timer, `spin = false`.
//!
//! The overlay node is always present: visibility tracks `busy`, opacity
//! tracks `spin` (0.8 once eligible, 0.0 before).

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tether_reactive::{Binding, BindingScope, Component, Observable, TimerHandle, Timers, bind_mapped};

use crate::view::OverlayView;

/// Spinner opacity once the debounce window has elapsed.
const SPIN_OPACITY: f32 = 0.8;

/// Overlay spinner label.
pub const BUSY_LABEL: &str = "Loading...";

/// The busy overlay component. Watches the client's busy cell; owns the
/// spin cell and its debounce timer.
pub struct BusyOverlay {
    busy: Observable<bool>,
    spin: Observable<bool>,
    opacity: Binding<f32>,
    pending: Rc<RefCell<Option<TimerHandle>>>,
    watch: BindingScope,
}

impl BusyOverlay {
    /// Build an overlay watching `busy`, debounced by `spin_delay` on the
    /// shared timer queue.
    #[must_use]
    pub fn new(busy: Observable<bool>, timers: Timers, spin_delay: Duration) -> Self {
        let spin = Observable::new(false);
        let pending: Rc<RefCell<Option<TimerHandle>>> = Rc::new(RefCell::new(None));

        let mut watch = BindingScope::new();
        {
            let spin = spin.clone();
            let timers = timers.clone();
            let pending = Rc::clone(&pending);
            watch.subscribe(&busy, move |now_busy: &bool| {
                // Every transition invalidates whatever timer was pending.
                if let Some(handle) = pending.borrow_mut().take() {
                    handle.cancel();
                }
                if *now_busy {
                    let spin = spin.clone();
                    *pending.borrow_mut() =
                        Some(timers.schedule(spin_delay, move || spin.set(true)));
                } else {
                    spin.set(false);
                }
            });
        }

        let opacity = bind_mapped(&spin, |s| if *s { SPIN_OPACITY } else { 0.0 });

        Self {
            busy,
            spin,
            opacity,
            pending,
            watch,
        }
    }

    /// The spin cell, readable for assertions and composition.
    #[must_use]
    pub fn spin(&self) -> Observable<bool> {
        self.spin.clone()
    }
}

impl Component for BusyOverlay {
    type Output = OverlayView;

    fn render(&self) -> OverlayView {
        OverlayView {
            visible: self.busy.get(),
            opacity: self.opacity.get(),
            label: BUSY_LABEL,
        }
    }

    fn dispose(&mut self) {
        // Stop watching busy and kill any armed timer; the spinner must
        // not resurface after unmount.
        self.watch.clear();
        if let Some(handle) = self.pending.borrow_mut().take() {
            handle.cancel();
        }
    }
}

impl std::fmt::Debug for BusyOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusyOverlay")
            .field("busy", &self.busy.get())
            .field("spin", &self.spin.get())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
