#![forbid(unsafe_code)]

//! The socket session: one duplex channel, three event shapes.
//!
//! [`connect`] opens the channel and binds it to a [`Client`]; the host
//! then feeds each raw inbound frame to [`Session::handle_frame`], which
//! decodes it and dispatches exactly one [`SockEvent`] to the handler
//! supplied at connect time.
//!
//! Any `Page` or `Msg` frame ends the outstanding round-trip (the busy
//! flag clears) *before* the handler runs, so a handler reading the busy
//! cell sees the settled state. `Reset` does not touch the busy flag; the
//! client instance is about to be torn down by a full reload.
//!
//! Reconnection, backoff, and heartbeats are deliberately absent here:
//! they are the transport's concern, behind the [`Connector`] seam.

use tracing::{debug, warn};

use crate::error::{ClientError, ProtocolError};
use crate::protocol::{self, ServerFrame, SockEvent};
use crate::sync::Client;
use crate::transport::Connector;

/// One live socket session.
pub struct Session {
    client: Client,
    handler: Box<dyn Fn(SockEvent)>,
    endpoint: String,
}

/// Open a duplex channel to `endpoint` and dispatch its events to
/// `handler` for the lifetime of the session.
pub fn connect(
    endpoint: &str,
    connector: &dyn Connector,
    client: Client,
    handler: impl Fn(SockEvent) + 'static,
) -> Result<Session, ClientError> {
    let transport = connector.connect(endpoint)?;
    client.attach(transport);
    debug!(endpoint, "session connected");
    Ok(Session {
        client,
        handler: Box::new(handler),
        endpoint: endpoint.to_owned(),
    })
}

impl Session {
    /// Decode one inbound frame and dispatch its event.
    ///
    /// A malformed frame is logged and returned as an error; no event is
    /// dispatched for it.
    pub fn handle_frame(&self, raw: &str) -> Result<(), ProtocolError> {
        let frame = match protocol::decode(raw) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%err, "dropping malformed frame");
                return Err(err);
            }
        };
        match frame {
            ServerFrame::Page { page } => {
                debug!(key = %page.key, "page received");
                self.client.finish_round_trip();
                (self.handler)(SockEvent::Data(page));
            }
            ServerFrame::Msg { kind, text } => {
                debug!(?kind, %text, "message received");
                self.client.finish_round_trip();
                (self.handler)(SockEvent::Message(kind, text));
            }
            ServerFrame::Reset => {
                debug!("session reset");
                (self.handler)(SockEvent::Reset);
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
