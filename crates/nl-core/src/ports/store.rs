//! Durable-store ports.
//!
//! The persisted state is a small keyed document: the display's token and
//! paired flag, the sender's pairing record, the pending command queue,
//! and the short-link resolve cache. Implementations must support
//! concurrent reads with a single logical writer per mutation.

use anyhow::Result;
use async_trait::async_trait;

use crate::pairing::{PairingRecord, PairingToken};

/// Display-side token persistence.
#[async_trait]
pub trait TokenStorePort: Send + Sync {
    async fn load_token(&self) -> Result<Option<PairingToken>>;

    async fn store_token(&self, token: &PairingToken) -> Result<()>;

    /// Whether a sender has completed an authenticated exchange against
    /// the current token.
    async fn display_paired(&self) -> Result<bool>;

    async fn set_display_paired(&self, paired: bool) -> Result<()>;
}

/// Sender-side pairing record persistence.
#[async_trait]
pub trait PairingRecordPort: Send + Sync {
    async fn load(&self) -> Result<Option<PairingRecord>>;

    async fn store(&self, record: &PairingRecord) -> Result<()>;
}

/// Ordered, persisted list of not-yet-delivered command URLs.
///
/// Duplicates collapse by URL identity. Entries leave the queue only
/// through explicit success or terminal-failure resolution.
#[async_trait]
pub trait PendingQueuePort: Send + Sync {
    async fn list(&self) -> Result<Vec<String>>;

    async fn append(&self, url: &str) -> Result<()>;

    async fn remove(&self, url: &str) -> Result<()>;
}

/// Short-link URL -> previously resolved canonical URL.
#[async_trait]
pub trait ResolveCachePort: Send + Sync {
    async fn get(&self, short_url: &str) -> Result<Option<String>>;

    async fn put(&self, short_url: &str, resolved: &str) -> Result<()>;
}
