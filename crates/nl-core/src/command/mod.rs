//! Command model and delivery outcomes for the sender side.

pub mod delivery;

pub use delivery::{DeliveryState, SendOutcome};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single "open this destination" command.
///
/// Commands are created from the normalizer's output and live until
/// confirmed delivery or a classified-permanent failure; in between they
/// may sit in the durable pending queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub destination_url: String,
    pub enqueued_at: DateTime<Utc>,
}

impl Command {
    pub fn new(destination_url: impl Into<String>) -> Self {
        Self {
            destination_url: destination_url.into(),
            enqueued_at: Utc::now(),
        }
    }
}
