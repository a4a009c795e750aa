//! JSON file-backed durable state store.
//!
//! One document holds everything both roles persist: the display's token
//! and paired flag, the sender's pairing record, the pending command
//! queue, and the short-link resolve cache. Writes go through a temp file
//! plus rename so the file is always either the previous or the fully
//! written new contents. A single mutex around the in-memory image gives
//! the single-logical-writer guarantee.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

use nl_core::pairing::{PairingRecord, PairingToken};
use nl_core::ports::{PairingRecordPort, PendingQueuePort, ResolveCachePort, TokenStorePort};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    server_token: Option<String>,

    #[serde(default)]
    display_paired: bool,

    #[serde(default)]
    remote: Option<PairingRecord>,

    #[serde(default)]
    pending_queue: Vec<String>,

    #[serde(default)]
    resolve_cache: BTreeMap<String, String>,
}

pub struct FileStateStore {
    path: PathBuf,
    state: Mutex<StateFile>,
}

impl FileStateStore {
    /// Open the store at `path`, loading the existing document or starting
    /// from defaults when the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = match fs::read_to_string(&path).await {
            Ok(content) => {
                let mut state: StateFile = serde_json::from_str(&content)
                    .with_context(|| format!("parse state file failed: {}", path.display()))?;
                if let Some(record) = state.remote.as_mut() {
                    record.repair_invariant();
                }
                state
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StateFile::default(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read state file failed: {}", path.display()))
            }
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    fn dir(&self) -> Option<&Path> {
        self.path.parent()
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(dir) = self.dir() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create state dir failed: {}", dir.display()))?;
        }
        Ok(())
    }

    async fn atomic_write(&self, state: &StateFile) -> Result<()> {
        self.ensure_parent_dir().await?;

        let content = serde_json::to_string_pretty(state).context("serialize state failed")?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &content)
            .await
            .with_context(|| format!("write temp state failed: {}", tmp_path.display()))?;

        fs::rename(&tmp_path, &self.path).await.with_context(|| {
            format!(
                "rename temp state to target failed: {} -> {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Apply one mutation under the store lock and persist the result.
    async fn mutate<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut StateFile),
    {
        let mut state = self.state.lock().await;
        apply(&mut state);
        self.atomic_write(&state).await
    }
}

#[async_trait]
impl TokenStorePort for FileStateStore {
    async fn load_token(&self) -> Result<Option<PairingToken>> {
        let state = self.state.lock().await;
        Ok(state.server_token.as_deref().map(PairingToken::new))
    }

    async fn store_token(&self, token: &PairingToken) -> Result<()> {
        self.mutate(|state| state.server_token = Some(token.as_str().to_string()))
            .await
    }

    async fn display_paired(&self) -> Result<bool> {
        Ok(self.state.lock().await.display_paired)
    }

    async fn set_display_paired(&self, paired: bool) -> Result<()> {
        self.mutate(|state| state.display_paired = paired).await
    }
}

#[async_trait]
impl PairingRecordPort for FileStateStore {
    async fn load(&self) -> Result<Option<PairingRecord>> {
        Ok(self.state.lock().await.remote.clone())
    }

    async fn store(&self, record: &PairingRecord) -> Result<()> {
        self.mutate(|state| state.remote = Some(record.clone()))
            .await
    }
}

#[async_trait]
impl PendingQueuePort for FileStateStore {
    async fn list(&self) -> Result<Vec<String>> {
        Ok(self.state.lock().await.pending_queue.clone())
    }

    async fn append(&self, url: &str) -> Result<()> {
        self.mutate(|state| {
            // Duplicates collapse by URL identity.
            if !state.pending_queue.iter().any(|entry| entry == url) {
                state.pending_queue.push(url.to_string());
            }
        })
        .await
    }

    async fn remove(&self, url: &str) -> Result<()> {
        self.mutate(|state| state.pending_queue.retain(|entry| entry != url))
            .await
    }
}

#[async_trait]
impl ResolveCachePort for FileStateStore {
    async fn get(&self, short_url: &str) -> Result<Option<String>> {
        Ok(self.state.lock().await.resolve_cache.get(short_url).cloned())
    }

    async fn put(&self, short_url: &str, resolved: &str) -> Result<()> {
        self.mutate(|state| {
            state
                .resolve_cache
                .insert(short_url.to_string(), resolved.to_string());
        })
        .await
    }
}
