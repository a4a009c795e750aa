//! Display-side pairing token lifecycle.
//!
//! The store supports concurrent reads; this service adds the
//! single-writer discipline so refresh is an atomic read-modify-write.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use tokio::sync::Mutex;

use nl_core::pairing::PairingToken;
use nl_core::ports::{TokenAuthorityPort, TokenStorePort};

pub struct TokenService {
    store: Arc<dyn TokenStorePort>,
    write_lock: Mutex<()>,
}

impl TokenService {
    pub fn new(store: Arc<dyn TokenStorePort>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Current token, generated and persisted lazily on first use.
    /// Idempotent thereafter.
    pub async fn get_token(&self) -> Result<PairingToken> {
        let _guard = self.write_lock.lock().await;
        if let Some(token) = self.store.load_token().await? {
            return Ok(token);
        }
        let token = PairingToken::generate();
        self.store.store_token(&token).await?;
        info!("pairing token created (hint {})", token.hint());
        Ok(token)
    }

    /// Rotate the token. The previous value stops working and the paired
    /// flag is cleared, so a stale sender is rejected until re-pairing.
    pub async fn refresh(&self) -> Result<PairingToken> {
        let _guard = self.write_lock.lock().await;
        let token = PairingToken::generate();
        self.store.store_token(&token).await?;
        self.store.set_display_paired(false).await?;
        info!("pairing token rotated (hint {})", token.hint());
        Ok(token)
    }

    pub async fn paired(&self) -> Result<bool> {
        self.store.display_paired().await
    }

    pub async fn mark_paired(&self) -> Result<()> {
        self.store.set_display_paired(true).await
    }
}

#[async_trait]
impl TokenAuthorityPort for TokenService {
    async fn current_token(&self) -> Result<PairingToken> {
        self.get_token().await
    }

    async fn refresh_token(&self) -> Result<PairingToken> {
        self.refresh().await
    }

    async fn is_display_paired(&self) -> Result<bool> {
        self.paired().await
    }

    async fn mark_display_paired(&self) -> Result<()> {
        self.mark_paired().await
    }
}
