//! Configuration file repository.
//!
//! Loads `config.json` from the application data directory, writing the
//! defaults on first run so operators have a file to edit.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use nl_core::config::AppConfig;

pub struct FileConfigRepository {
    path: PathBuf,
}

impl FileConfigRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn dir(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// Load the configuration, creating the file with defaults when absent.
    pub async fn load_or_init(&self) -> Result<AppConfig> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("parse config failed: {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = AppConfig::default();
                self.save(&config).await?;
                Ok(config)
            }
            Err(e) => {
                Err(e).with_context(|| format!("read config failed: {}", self.path.display()))
            }
        }
    }

    pub async fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(dir) = self.dir() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create config dir failed: {}", dir.display()))?;
        }
        let content = serde_json::to_string_pretty(config).context("serialize config failed")?;
        fs::write(&self.path, content)
            .await
            .with_context(|| format!("write config failed: {}", self.path.display()))
    }
}
