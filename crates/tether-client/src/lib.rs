#![forbid(unsafe_code)]

//! Socket session and server synchronization for tether.
//!
//! The server drives the UI: it pushes pages over a persistent duplex
//! channel, and the client answers with argument state. This crate owns
//! that conversation:
//!
//! - [`protocol`]: the JSON wire frames and the typed [`SockEvent`]s the
//!   shell consumes.
//! - [`transport`]: the seam to the external duplex channel ([`Transport`],
//!   [`Connector`]). Framing, reconnect, and heartbeats live behind it.
//! - [`Client`]: the per-session argument store, busy flag, and `sync()`.
//! - [`Session`] / [`connect`]: decodes inbound frames and dispatches
//!   exactly one typed event each to the caller-supplied handler.
//!
//! All failure is data: malformed frames and send errors are typed errors
//! logged via `tracing`, never panics, and the shell only ever sees the
//! three event shapes of [`SockEvent`].

pub mod protocol;
pub mod session;
pub mod sync;
pub mod transport;

mod error;

pub use error::{ClientError, ProtocolError, TransportError};
pub use protocol::{ClientFrame, Page, ServerFrame, SockEvent, SockMessageType};
pub use session::{Session, connect};
pub use sync::Client;
pub use transport::{Connector, Transport};

/// Default socket endpoint.
pub const DEFAULT_ENDPOINT: &str = "/_s";
