//! Radio relay wire protocol.
//!
//! Newline-delimited JSON objects over a persistent point-to-point
//! connection. There is no length prefix; the message boundary is the
//! newline. `HELLO` must be the first message on a connection; `OPEN_URL`
//! is only honored after a successful `HELLO`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Well-known service name both roles use to find each other.
pub const RADIO_SERVICE_NAME: &str = "navlink-relay";

/// Shared constant service identifier advertised over the radio link.
pub const RADIO_SERVICE_ID: &str = "9b7f4a1e-52c3-4e8d-a6b0-3d92c15e7f04";

/// Upper bound for a single wire line; longer lines indicate a broken or
/// hostile peer and abort the connection.
pub const MAX_RADIO_LINE_BYTES: usize = 8 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed radio message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Messages exchanged over the radio link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RadioMessage {
    /// Greeting carrying the short numeric pairing code the display shows
    /// out-of-band. Must be the first message on a connection.
    #[serde(rename = "HELLO")]
    Hello { code: String },

    /// Open a destination; accepted only after a successful `HELLO`.
    #[serde(rename = "OPEN_URL")]
    OpenUrl { url: String },
}

impl RadioMessage {
    /// Serialize to a single wire line (without the trailing newline; the
    /// line codec appends it).
    pub fn to_line(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse one wire line.
    pub fn from_line(line: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(line.trim())?)
    }
}
