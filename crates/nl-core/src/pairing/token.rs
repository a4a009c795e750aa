//! Pairing token: the shared secret that authenticates open-url requests.
//!
//! A token identifies trust, not identity. Exactly one token is active per
//! display instance; rotating it invalidates every sender that saved the
//! previous value.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Random bytes per token; hex-encoded this yields 24 characters.
pub const TOKEN_BYTES: usize = 12;

/// Characters revealed by a hint: first 4 + last 4.
const HINT_EDGE: usize = 4;

/// An opaque shared secret, stored as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairingToken(String);

impl PairingToken {
    /// Wrap an existing token value (e.g. read back from the durable store
    /// or received in a pairing payload). The value is opaque; no format
    /// check is applied beyond trimming.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// Generate a fresh token from the OS-seeded CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Constant-time comparison against a presented token value.
    pub fn matches(&self, presented: &str) -> bool {
        self.0.as_bytes().ct_eq(presented.as_bytes()).into()
    }

    /// Display-safe fragment for out-of-band comparison: first 4 + last 4
    /// characters, never more than 8 characters total.
    pub fn hint(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= HINT_EDGE * 2 {
            return self.0.clone();
        }
        let head: String = chars[..HINT_EDGE].iter().collect();
        let tail: String = chars[chars.len() - HINT_EDGE..].iter().collect();
        format!("{}{}", head, tail)
    }
}

impl std::fmt::Display for PairingToken {
    /// Tokens are secrets; Display renders the hint, not the value.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hint())
    }
}
