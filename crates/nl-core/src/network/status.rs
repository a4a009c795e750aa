//! The display's public status report.

use serde::{Deserialize, Serialize};

/// Response body of `GET /status`. Carries no secret: the token is only
/// represented by its hint, so the sender can confirm the remote's token
/// without the value crossing the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub ok: bool,
    pub ip: String,
    pub port: u16,
    pub paired: bool,
    #[serde(rename = "tokenHint")]
    pub token_hint: String,
    pub version: String,
}
