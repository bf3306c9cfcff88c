#![forbid(unsafe_code)]

//! Reactive state primitives for tether.
//!
//! This crate provides the change-tracking core that drives re-rendering in
//! the tether client shell:
//!
//! - [`Observable`]: a shared, version-tracked value cell with change
//!   notification via subscriber callbacks.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//! - [`Emitter`]: the always-notify sibling of `Observable`, used for
//!   discrete events (hash changes, link clicks) where equality suppression
//!   would be wrong.
//! - [`Binding`] / [`BindingScope`]: read bindings over observables and a
//!   drop-releases-everything subscription scope.
//! - [`Component`] / [`Mount`]: a render unit with per-render dependency
//!   tracking, coalesced re-render scheduling, and exactly-once
//!   init/dispose lifecycle.
//! - [`RenderScheduler`]: the host-driven queue that coalesces cell writes
//!   within one event callback into a single render pass per mount.
//! - [`Timers`] / [`TimerHandle`]: a cancelable deadline queue for
//!   debounce-style effects outside any component lifecycle.
//!
//! # Architecture
//!
//! Everything here is single-threaded and cooperative: `Rc`/`RefCell` shared
//! ownership, no locks, no blocking. Cell writes notify subscribers
//! synchronously; mounts translate those notifications into dirty marks that
//! the host flushes after each event callback, so observers never see a torn
//! intermediate state and N writes in one callback cost one render.
//!
//! Dependency tracking is explicit: each render pass runs inside a tracking
//! frame that records every cell read, and the mount diffs that read set
//! against the previous pass, subscribing and unsubscribing the delta. There
//! is no interception of reads outside a render pass.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op (no version
//!    bump, no notifications).
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 5. A mount renders at most once per scheduler flush, regardless of how
//!    many of its tracked cells changed before the flush.
//! 6. `init` and `dispose` each run exactly once per mount.

pub mod binding;
pub mod component;
pub mod emitter;
pub mod observable;
pub mod scheduler;
pub mod timer;

mod track;

pub use binding::{Binding, BindingScope, bind_mapped, bind_observable};
pub use component::{Component, Mount};
pub use emitter::Emitter;
pub use observable::{Observable, Subscription};
pub use scheduler::RenderScheduler;
pub use timer::{TimerHandle, Timers};
