//! Delivery state machine vocabulary.
//!
//! The state is an explicit value observed through a subscription, never a
//! shared field mutated in place; each send operation reports its terminal
//! outcome as a structured result.

use serde::{Deserialize, Serialize};

/// Sender-side delivery state, derived transiently from the latest
/// network outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// No pairing record with usable credentials exists yet.
    Unpaired,
    /// The remote is reachable but reports it is not paired.
    Pairing,
    /// A delivery attempt is in flight.
    Connecting,
    /// The last authenticated round-trip succeeded.
    Connected,
    /// The remote rejected our credentials; re-pairing is required.
    AuthFailed,
    /// The remote is unreachable; commands are queued for later delivery.
    Offline,
}

/// Terminal outcome of a single `send_command` invocation.
///
/// Exactly one of `delivered`, `queued`, or a permanent failure applies;
/// intermediate retry attempts are not individually surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    pub delivered: bool,
    pub queued: bool,
    pub auth_failed: bool,
    pub reason: Option<String>,
}

impl SendOutcome {
    pub fn delivered() -> Self {
        Self {
            delivered: true,
            queued: false,
            auth_failed: false,
            reason: None,
        }
    }

    /// Recoverable failure: the command was appended to the pending queue.
    pub fn queued(reason: impl Into<String>) -> Self {
        Self {
            delivered: false,
            queued: true,
            auth_failed: false,
            reason: Some(reason.into()),
        }
    }

    /// Permanent authentication failure; never queued, since retrying
    /// with the same token cannot succeed.
    pub fn auth_failed(reason: impl Into<String>) -> Self {
        Self {
            delivered: false,
            queued: false,
            auth_failed: true,
            reason: Some(reason.into()),
        }
    }

    /// Permanent non-authentication rejection (configuration or policy).
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            delivered: false,
            queued: false,
            auth_failed: false,
            reason: Some(reason.into()),
        }
    }

    /// True when the command needs no further delivery attempts: it was
    /// either delivered or failed permanently.
    pub fn is_settled(&self) -> bool {
        self.delivered || !self.queued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_covers_delivery_and_permanent_failure() {
        assert!(SendOutcome::delivered().is_settled());
        assert!(SendOutcome::auth_failed("bad token").is_settled());
        assert!(SendOutcome::rejected("not paired").is_settled());
        assert!(!SendOutcome::queued("offline").is_settled());
    }
}
