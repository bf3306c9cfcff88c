#![forbid(unsafe_code)]

//! Wire frames and the typed socket events the shell consumes.
//!
//! The wire encoding is this layer's own concern: one JSON object per
//! frame, tagged by `"t"`. The rest of the client never touches raw JSON:
//! inbound frames become [`SockEvent`]s, outbound state becomes a
//! [`ClientFrame`].
//!
//! | direction | frame | shape |
//! |-----------|-------|-------|
//! | server → client | page | `{"t":"page","page":{"key":..,"body":..}}` |
//! | server → client | msg | `{"t":"msg","kind":"err","text":".."}` |
//! | server → client | reset | `{"t":"reset"}` |
//! | client → server | sync | `{"t":"sync","args":{..}}` |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

/// An opaque, server-defined page descriptor.
///
/// The client never inspects `body`; `key` identifies the page and forces a
/// full remount of the layout subtree when it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub key: String,
    #[serde(default)]
    pub body: Value,
}

impl Page {
    #[must_use]
    pub fn new(key: impl Into<String>, body: Value) -> Self {
        Self {
            key: key.into(),
            body,
        }
    }
}

/// Severity of an inline protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SockMessageType {
    Info,
    Warn,
    Err,
}

/// Frames the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerFrame {
    Page { page: Page },
    Msg { kind: SockMessageType, text: String },
    Reset,
}

/// Frames the client sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientFrame {
    Sync { args: serde_json::Map<String, Value> },
}

/// The three event shapes the app shell reacts to. Transient: produced per
/// inbound frame, consumed by the handler, never stored.
#[derive(Debug, Clone, PartialEq)]
pub enum SockEvent {
    /// The server pushed a fresh page; it replaces all prior page/error
    /// state wholesale.
    Data(Page),
    /// An inline message. Only `Err` is meaningful to the shell.
    Message(SockMessageType, String),
    /// The session is no longer valid; the only correct response is a full
    /// reload.
    Reset,
}

/// Decode one inbound frame.
pub fn decode(raw: &str) -> Result<ServerFrame, ProtocolError> {
    Ok(serde_json::from_str(raw)?)
}

/// Encode one outbound frame.
pub fn encode(frame: &ClientFrame) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(frame)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
