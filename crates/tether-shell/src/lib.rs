#![forbid(unsafe_code)]

//! The tether app shell.
//!
//! This crate is the root of the server-driven UI client: it owns the
//! page/error state machine, turns socket events into state transitions,
//! debounces the busy spinner, and composes the view the host commits to
//! the screen. Layout, theming, and dialogs stay behind the collaborator
//! traits in [`view`]; the socket stays behind
//! [`tether_client`]'s transport seam.
//!
//! A host wires it up like this: build a [`Client`](tether_client::Client),
//! a [`RenderScheduler`](tether_reactive::RenderScheduler) and
//! [`Timers`](tether_reactive::Timers), mount an [`AppShell`] and a
//! [`BusyOverlay`] (side by side, so each re-renders independently), then
//! loop: dispatch one environment or socket event, `flush()` the
//! scheduler, `fire_due()` the timers.

pub mod busy;
pub mod config;
pub mod shell;
pub mod view;

pub use busy::{BUSY_LABEL, BusyOverlay};
pub use config::{ConfigError, ShellConfig};
pub use shell::{AppShell, Collaborators, LOADING_LABEL, SessionHandle, ShellEvents, WAITING_LABEL};
pub use view::{
    Chrome, Color, DialogHost, DialogNode, LayoutNode, OverlayView, PageLayout, Platform, Theme,
    View,
};
