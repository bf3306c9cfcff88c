#![forbid(unsafe_code)]

//! Client error taxonomy.
//!
//! Failures never cross component boundaries as panics; everything the
//! session or sync layer can hit is one of these.

use thiserror::Error;

/// A frame that could not be decoded or encoded.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Inbound or outbound JSON did not match the frame schema.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The duplex channel failed.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The channel is closed; no further sends will succeed.
    #[error("transport closed")]
    Closed,

    /// The endpoint could not be opened.
    #[error("connect to {endpoint} failed: {reason}")]
    Connect { endpoint: String, reason: String },

    /// A send was rejected by the underlying channel.
    #[error("send failed: {0}")]
    Send(String),
}

/// Umbrella error for client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// `sync()` was called before a transport was attached.
    #[error("not connected")]
    NotConnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_human_readable() {
        let err = TransportError::Connect {
            endpoint: "/_s".into(),
            reason: "refused".into(),
        };
        assert_eq!(err.to_string(), "connect to /_s failed: refused");
        assert_eq!(ClientError::NotConnected.to_string(), "not connected");
    }

    #[test]
    fn protocol_error_wraps_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ProtocolError::from(serde_err);
        assert!(err.to_string().starts_with("malformed frame:"));
    }
}
