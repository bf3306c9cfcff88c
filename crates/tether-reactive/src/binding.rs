#![forbid(unsafe_code)]

//! Read bindings over observables, and scoped subscription lifetimes.
//!
//! A [`Binding<T>`] packages an observable source plus an optional transform
//! so components can derive display values from reactive state. Evaluation
//! is lazy on each `get()`; reads go through the source cell, so a binding
//! read inside a render pass tracks like a direct cell read.
//!
//! [`BindingScope`] collects [`Subscription`]s for a logical scope (a
//! component's standing listeners, for example). Dropping or clearing the
//! scope releases them all; the app shell leans on this to guarantee zero
//! residual listeners after dispose.

use std::rc::Rc;

use crate::emitter::Emitter;
use crate::observable::{Observable, Subscription};

// ---------------------------------------------------------------------------
// Binding<T> — one-way read binding
// ---------------------------------------------------------------------------

/// A read-only binding to reactive state with an optional transform.
pub struct Binding<T> {
    eval: Rc<dyn Fn() -> T>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            eval: Rc::clone(&self.eval),
        }
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding").field("value", &self.get()).finish()
    }
}

impl<T: 'static> Binding<T> {
    /// Create a binding that evaluates `f` on each `get()` call.
    pub fn new(f: impl Fn() -> T + 'static) -> Self {
        Self { eval: Rc::new(f) }
    }

    /// Get the current bound value.
    #[must_use]
    pub fn get(&self) -> T {
        (self.eval)()
    }

    /// Apply a further transform, returning a new `Binding`.
    pub fn then<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Binding<U> {
        Binding {
            eval: Rc::new(move || f((self.eval)())),
        }
    }
}

/// Create a direct binding to an observable (identity transform).
pub fn bind_observable<T: Clone + PartialEq + 'static>(source: &Observable<T>) -> Binding<T> {
    let src = source.clone();
    Binding {
        eval: Rc::new(move || src.get()),
    }
}

/// Create a mapped binding: `source` value transformed by `map`.
pub fn bind_mapped<S: Clone + PartialEq + 'static, T: 'static>(
    source: &Observable<S>,
    map: impl Fn(&S) -> T + 'static,
) -> Binding<T> {
    let src = source.clone();
    Binding {
        eval: Rc::new(move || src.with(|v| map(v))),
    }
}

// ---------------------------------------------------------------------------
// BindingScope — lifecycle management
// ---------------------------------------------------------------------------

/// Collects subscriptions for a logical scope.
///
/// # Invariants
///
/// 1. Subscriptions are released in reverse registration order on drop.
/// 2. After drop or [`clear`](BindingScope::clear), no callback held by
///    this scope will fire again.
/// 3. `clear()` leaves the scope empty but reusable.
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
}

impl BindingScope {
    /// Create an empty binding scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Hold an externally-created subscription until the scope is released.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Subscribe to an observable within this scope.
    pub fn subscribe<T: Clone + PartialEq + 'static>(
        &mut self,
        source: &Observable<T>,
        callback: impl Fn(&T) + 'static,
    ) -> &mut Self {
        let sub = source.subscribe(callback);
        self.subscriptions.push(sub);
        self
    }

    /// Listen to an event emitter within this scope.
    pub fn listen<T: 'static>(
        &mut self,
        source: &Emitter<T>,
        callback: impl Fn(&T) + 'static,
    ) -> &mut Self {
        let sub = source.subscribe(callback);
        self.subscriptions.push(sub);
        self
    }

    /// Number of active subscriptions in this scope.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether the scope has no active subscriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release all subscriptions immediately.
    pub fn clear(&mut self) {
        // Reverse registration order, matching drop.
        while self.subscriptions.pop().is_some() {}
    }
}

impl Default for BindingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.subscriptions.len())
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

    #[test]
    fn binding_tracks_source() {
        let cell = Observable::new(42);
        let b = bind_observable(&cell);
        assert_eq!(b.get(), 42);

        cell.set(100);
        assert_eq!(b.get(), 100);
    }

    #[test]
    fn mapped_binding_transforms() {
        let count = Observable::new(3);
        let label = bind_mapped(&count, |c| format!("items: {c}"));
        assert_eq!(label.get(), "items: 3");

        count.set(7);
        assert_eq!(label.get(), "items: 7");
    }

    #[test]
    fn then_chains_transforms() {
        let cell = Observable::new(5);
        let doubled = bind_observable(&cell).then(|v| v * 2);
        assert_eq!(doubled.get(), 10);

        cell.set(3);
        assert_eq!(doubled.get(), 6);
    }

    #[test]
    fn binding_clone_shares_source() {
        let cell = Observable::new(1);
        let b1 = bind_observable(&cell);
        let b2 = b1.clone();

        cell.set(99);
        assert_eq!(b1.get(), 99);
        assert_eq!(b2.get(), 99);
    }

    #[test]
    fn scope_holds_and_drop_releases() {
        let cell = Observable::new(0);
        let seen = Rc::new(Cell::new(0));
        {
            let mut scope = BindingScope::new();
            let s = Rc::clone(&seen);
            scope.subscribe(&cell, move |v| s.set(*v));
            assert_eq!(scope.binding_count(), 1);
            cell.set(1);
            assert_eq!(seen.get(), 1);
        }
        cell.set(99);
        assert_eq!(seen.get(), 1, "callback must not fire after scope drop");
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn scope_clear_releases_and_is_reusable() {
        let cell = Observable::new(0);
        let first = Rc::new(Cell::new(false));
        let second = Rc::new(Cell::new(false));

        let mut scope = BindingScope::new();
        let f = Rc::clone(&first);
        scope.subscribe(&cell, move |_| f.set(true));
        scope.clear();
        assert!(scope.is_empty());

        let s = Rc::clone(&second);
        scope.subscribe(&cell, move |_| s.set(true));
        cell.set(1);
        assert!(!first.get(), "cleared subscription must be gone");
        assert!(second.get(), "new subscription must be live");
    }

    #[test]
    fn scope_listens_to_emitters() {
        let clicks: Emitter<String> = Emitter::new();
        let count = Rc::new(Cell::new(0));

        let mut scope = BindingScope::new();
        let c = Rc::clone(&count);
        scope.listen(&clicks, move |_| c.set(c.get() + 1));

        clicks.emit("a".into());
        assert_eq!(count.get(), 1);

        scope.clear();
        clicks.emit("b".into());
        assert_eq!(count.get(), 1);
        assert_eq!(clicks.subscriber_count(), 0);
    }

    #[test]
    fn scope_hold_external_subscription() {
        let cell = Observable::new(0);
        let seen = Rc::new(Cell::new(0));

        let mut scope = BindingScope::new();
        let s = Rc::clone(&seen);
        scope.hold(cell.subscribe(move |v| s.set(*v)));

        cell.set(5);
        assert_eq!(seen.get(), 5);

        drop(scope);
        cell.set(9);
        assert_eq!(seen.get(), 5);
    }
}
