//! Short numeric pairing code for the radio handshake.
//!
//! The display generates and shows the code out-of-band; the sender's
//! operator types it in. This is independent of the HTTP pairing token.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Code length in digits.
pub const CODE_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairingCode(String);

impl PairingCode {
    /// Generate a random 6-digit code.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code = (0..CODE_LENGTH)
            .map(|_| rng.random_range(0..10).to_string())
            .collect();
        Self(code)
    }

    /// Accept an operator-entered code. Must be exactly six ASCII digits.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() == CODE_LENGTH && raw.chars().all(|c| c.is_ascii_digit()) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, presented: &str) -> bool {
        self.0 == presented
    }
}

impl std::fmt::Display for PairingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
