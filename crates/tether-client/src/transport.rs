#![forbid(unsafe_code)]

//! The seam to the external duplex channel.
//!
//! The core observes the socket only through discrete events; everything
//! about the channel itself (framing, TLS, reconnect policy, heartbeats)
//! belongs to the [`Transport`] implementation behind this seam. The host
//! feeds inbound frames to [`Session::handle_frame`](crate::Session::handle_frame)
//! and the client sends outbound frames through [`Transport::send`].

use crate::error::TransportError;

/// Outbound half of one duplex channel.
pub trait Transport {
    /// Queue one text frame for delivery to the server.
    fn send(&self, frame: &str) -> Result<(), TransportError>;
}

/// Opens a [`Transport`] for an endpoint.
pub trait Connector {
    fn connect(&self, endpoint: &str) -> Result<Box<dyn Transport>, TransportError>;
}

// ---------------------------------------------------------------------------
// Loopback transport (test helper)
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing {
    //! In-memory transport for driving a session from tests.

    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::{Connector, Transport, TransportError};

    /// Captures every frame sent through it; can be told to fail.
    #[derive(Clone, Default)]
    pub struct LoopbackTransport {
        sent: Rc<RefCell<Vec<String>>>,
        fail_sends: Rc<Cell<bool>>,
    }

    impl LoopbackTransport {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Frames sent so far, oldest first.
        #[must_use]
        pub fn sent(&self) -> Vec<String> {
            self.sent.borrow().clone()
        }

        #[must_use]
        pub fn sent_count(&self) -> usize {
            self.sent.borrow().len()
        }

        /// Make every subsequent send fail.
        pub fn fail_sends(&self, fail: bool) {
            self.fail_sends.set(fail);
        }
    }

    impl Transport for LoopbackTransport {
        fn send(&self, frame: &str) -> Result<(), TransportError> {
            if self.fail_sends.get() {
                return Err(TransportError::Closed);
            }
            self.sent.borrow_mut().push(frame.to_owned());
            Ok(())
        }
    }

    /// Hands out clones of one [`LoopbackTransport`] and records the
    /// endpoints it was asked to open.
    #[derive(Clone, Default)]
    pub struct LoopbackConnector {
        transport: LoopbackTransport,
        endpoints: Rc<RefCell<Vec<String>>>,
        refuse: Rc<Cell<bool>>,
    }

    impl LoopbackConnector {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// The shared transport every `connect` call hands out.
        #[must_use]
        pub fn transport(&self) -> LoopbackTransport {
            self.transport.clone()
        }

        /// Endpoints opened so far.
        #[must_use]
        pub fn endpoints(&self) -> Vec<String> {
            self.endpoints.borrow().clone()
        }

        /// Make every subsequent connect fail.
        pub fn refuse(&self, refuse: bool) {
            self.refuse.set(refuse);
        }
    }

    impl Connector for LoopbackConnector {
        fn connect(&self, endpoint: &str) -> Result<Box<dyn Transport>, TransportError> {
            if self.refuse.get() {
                return Err(TransportError::Connect {
                    endpoint: endpoint.to_owned(),
                    reason: "refused".into(),
                });
            }
            self.endpoints.borrow_mut().push(endpoint.to_owned());
            Ok(Box::new(self.transport.clone()))
        }
    }

}
