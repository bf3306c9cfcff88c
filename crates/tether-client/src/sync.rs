#![forbid(unsafe_code)]

//! The synchronization client: argument store, busy flag, `sync()`.
//!
//! One [`Client`] holds the process-wide synchronization state for one
//! session. It is a cheap shared handle (clone freely); the single owning
//! session constructs it at app start and it lives until full reload.
//!
//! - **Args**: name → JSON value, mutated by UI interactions (hash changes,
//!   link clicks) and flushed wholesale by [`sync`](Client::sync).
//! - **Busy flag**: an [`Observable<bool>`] set true around each
//!   request/response pair. Written only here; the busy overlay is its one
//!   reader.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use serde_json::Value;
use tracing::{debug, warn};

use tether_reactive::Observable;

use crate::error::ClientError;
use crate::protocol::{self, ClientFrame};
use crate::transport::Transport;

struct ClientInner {
    args: RefCell<AHashMap<String, Value>>,
    busy: Observable<bool>,
    transport: RefCell<Option<Box<dyn Transport>>>,
}

/// Shared handle to one session's synchronization state.
#[derive(Clone)]
pub struct Client {
    inner: Rc<ClientInner>,
}

impl Client {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ClientInner {
                args: RefCell::new(AHashMap::new()),
                busy: Observable::new(false),
                transport: RefCell::new(None),
            }),
        }
    }

    /// The busy cell. Read it (or subscribe) to observe round-trips; only
    /// the client writes it.
    #[must_use]
    pub fn busy(&self) -> Observable<bool> {
        self.inner.busy.clone()
    }

    /// Set one argument. Overwrites any pending value under the same name.
    pub fn set_arg(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner.args.borrow_mut().insert(name.into(), value.into());
    }

    /// Current pending value of one argument.
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<Value> {
        self.inner.args.borrow().get(name).cloned()
    }

    /// Number of pending arguments.
    #[must_use]
    pub fn args_len(&self) -> usize {
        self.inner.args.borrow().len()
    }

    /// Attach the outbound half of the duplex channel. Replaces any
    /// previous transport.
    pub fn attach(&self, transport: Box<dyn Transport>) {
        *self.inner.transport.borrow_mut() = Some(transport);
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.transport.borrow().is_some()
    }

    /// Flush pending argument state to the server as one sync frame.
    ///
    /// Marks the session busy before sending; a failed send resets the
    /// busy flag and leaves the pending args in place for a retry. On
    /// success the store is cleared.
    pub fn sync(&self) -> Result<(), ClientError> {
        let frame = {
            let args = self.inner.args.borrow();
            let mut map = serde_json::Map::with_capacity(args.len());
            for (name, value) in args.iter() {
                map.insert(name.clone(), value.clone());
            }
            ClientFrame::Sync { args: map }
        };
        let raw = protocol::encode(&frame)?;

        self.inner.busy.set(true);
        let result = {
            let transport = self.inner.transport.borrow();
            match transport.as_ref() {
                Some(transport) => transport.send(&raw).map_err(ClientError::from),
                None => Err(ClientError::NotConnected),
            }
        };
        match result {
            Ok(()) => {
                debug!(args = self.args_len(), "sync flushed");
                self.inner.args.borrow_mut().clear();
                Ok(())
            }
            Err(err) => {
                warn!(%err, "sync failed");
                self.inner.busy.set(false);
                Err(err)
            }
        }
    }

    /// A server response arrived; the round-trip is over.
    pub(crate) fn finish_round_trip(&self) {
        self.inner.busy.set(false);
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("args", &self.args_len())
            .field("busy", &self.inner.busy.get())
            .field("connected", &self.is_connected())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
