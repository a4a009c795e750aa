//! Token authority port - the display-side token lifecycle as seen by the
//! control-plane server.

use anyhow::Result;
use async_trait::async_trait;

use crate::pairing::PairingToken;

/// Owns the shared secret and its lifecycle on the display device.
///
/// Implementations must serialize mutations (an atomic read-modify-write
/// on refresh) while allowing concurrent reads.
#[async_trait]
pub trait TokenAuthorityPort: Send + Sync {
    /// Current token, created lazily and persisted on first use.
    async fn current_token(&self) -> Result<PairingToken>;

    /// Rotate to a fresh random token, invalidating the previous one and
    /// clearing the display's paired flag.
    async fn refresh_token(&self) -> Result<PairingToken>;

    async fn is_display_paired(&self) -> Result<bool>;

    /// Record that a sender completed an authenticated exchange.
    async fn mark_display_paired(&self) -> Result<()>;
}
