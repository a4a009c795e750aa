//! Destination opener backed by the OS URL handler.
//!
//! Spawns the configured handler command with the destination URL as its
//! single argument. A headless display has no GUI shell plugin, so the
//! open effect is delegated to the platform's opener binary.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use nl_core::ports::OpenerPort;

/// Platform default URL handler.
#[cfg(target_os = "macos")]
const PLATFORM_OPEN_COMMAND: &str = "open";
#[cfg(not(target_os = "macos"))]
const PLATFORM_OPEN_COMMAND: &str = "xdg-open";

pub struct ProcessOpener {
    maps_command: String,
    browser_command: String,
}

impl ProcessOpener {
    /// `maps_command` opens the maps application; `browser_command` is the
    /// generic browser-capable fallback. `None` selects the platform
    /// default handler for either role.
    pub fn new(maps_command: Option<String>, browser_command: Option<String>) -> Self {
        Self {
            maps_command: maps_command.unwrap_or_else(|| PLATFORM_OPEN_COMMAND.to_string()),
            browser_command: browser_command.unwrap_or_else(|| PLATFORM_OPEN_COMMAND.to_string()),
        }
    }

    async fn spawn(command: &str, url: &str) -> Result<()> {
        debug!("opening destination via `{}`: {}", command, url);
        let status = Command::new(command)
            .arg(url)
            .status()
            .await
            .with_context(|| format!("spawn `{}` failed", command))?;

        if status.success() {
            Ok(())
        } else {
            Err(anyhow!("`{}` exited with {}", command, status))
        }
    }
}

impl Default for ProcessOpener {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[async_trait]
impl OpenerPort for ProcessOpener {
    async fn open_maps(&self, url: &str) -> Result<()> {
        Self::spawn(&self.maps_command, url).await
    }

    async fn open_fallback(&self, url: &str) -> Result<()> {
        Self::spawn(&self.browser_command, url).await
    }
}
