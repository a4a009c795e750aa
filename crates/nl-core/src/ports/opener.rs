//! Destination opener port - the display's "open this destination" effect.

use anyhow::Result;
use async_trait::async_trait;

/// Launches the destination URL on the display device.
#[async_trait]
pub trait OpenerPort: Send + Sync {
    /// Open the destination in the maps application.
    async fn open_maps(&self, url: &str) -> Result<()>;

    /// Open the destination in a generic browser-capable handler, used as
    /// the one-shot fallback when the maps handler fails.
    async fn open_fallback(&self, url: &str) -> Result<()>;
}
