//! Sender-side record of the paired display.

use serde::{Deserialize, Serialize};

use super::payload::PairingPayload;

/// What the sender knows about its display.
///
/// `paired` means a token/address triple has been saved (e.g. via the QR
/// exchange). `verified` means a successful authenticated round-trip has
/// been observed against that exact token. Invariant: `verified` implies
/// `paired`; verification is cleared whenever authentication fails or the
/// saved credentials change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingRecord {
    pub address: String,
    pub port: u16,
    pub token: String,
    pub paired: bool,
    pub verified: bool,
}

impl PairingRecord {
    /// Build a fresh record from an out-of-band pairing payload.
    /// The record starts paired but unverified.
    pub fn from_payload(payload: &PairingPayload) -> Self {
        Self {
            address: payload.ip.clone(),
            port: payload.port,
            token: payload.token.clone(),
            paired: true,
            verified: false,
        }
    }

    /// True when both the address and the token are non-empty.
    pub fn has_credentials(&self) -> bool {
        !self.address.is_empty() && !self.token.is_empty()
    }

    pub fn mark_verified(&mut self) {
        if self.paired {
            self.verified = true;
        }
    }

    pub fn clear_verified(&mut self) {
        self.verified = false;
    }

    /// Replace the saved credentials. Any change to the token or address
    /// invalidates prior verification.
    pub fn update_credentials(&mut self, address: String, port: u16, token: String) {
        if address != self.address || token != self.token {
            self.verified = false;
        }
        self.address = address;
        self.port = port;
        self.token = token;
        self.paired = self.has_credentials();
    }

    /// Re-establish the invariant after deserializing from an external
    /// source that may have stored an inconsistent pair of flags.
    pub fn repair_invariant(&mut self) {
        if !self.paired {
            self.verified = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PairingRecord {
        PairingRecord {
            address: "192.168.1.40".to_string(),
            port: 8765,
            token: "abcd1234efgh5678ijkl9012".to_string(),
            paired: true,
            verified: false,
        }
    }

    #[test]
    fn from_payload_starts_paired_but_unverified() {
        let payload = PairingPayload {
            ip: "192.168.1.40".to_string(),
            port: 8765,
            token: "abcd1234efgh5678ijkl9012".to_string(),
        };
        let record = PairingRecord::from_payload(&payload);
        assert!(record.paired);
        assert!(!record.verified);
        assert!(record.has_credentials());
    }

    #[test]
    fn verified_requires_paired() {
        let mut unpaired = PairingRecord::default();
        unpaired.mark_verified();
        assert!(!unpaired.verified);

        let mut paired = record();
        paired.mark_verified();
        assert!(paired.verified);
    }

    #[test]
    fn changing_token_clears_verification() {
        let mut record = record();
        record.mark_verified();
        record.update_credentials(
            record.address.clone(),
            record.port,
            "ef567890ef567890ef567890".to_string(),
        );
        assert!(!record.verified);
        assert!(record.paired);
    }

    #[test]
    fn changing_address_clears_verification() {
        let mut record = record();
        record.mark_verified();
        record.update_credentials("192.168.1.41".to_string(), record.port, record.token.clone());
        assert!(!record.verified);
    }

    #[test]
    fn repair_invariant_drops_orphaned_verified_flag() {
        let mut record = record();
        record.paired = false;
        record.verified = true;
        record.repair_invariant();
        assert!(!record.verified);
    }
}
