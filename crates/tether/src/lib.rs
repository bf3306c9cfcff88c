#![forbid(unsafe_code)]

//! tether public facade.
//!
//! Re-exports the member crates and provides a prelude with the types a
//! host needs to boot the client shell.

pub use tether_client as client;
pub use tether_reactive as reactive;
pub use tether_shell as shell;

/// Everything a host typically imports.
pub mod prelude {
    pub use tether_client::{
        Client, ClientError, Connector, Page, Session, SockEvent, SockMessageType, Transport,
        connect,
    };
    pub use tether_reactive::{
        Binding, BindingScope, Component, Emitter, Mount, Observable, RenderScheduler,
        Subscription, TimerHandle, Timers,
    };
    pub use tether_shell::{
        AppShell, BusyOverlay, Collaborators, DialogHost, OverlayView, PageLayout, Platform,
        SessionHandle, ShellConfig, ShellEvents, Theme, View,
    };
}
