//! Application configuration shared by both device roles.

use serde::{Deserialize, Serialize};

/// Default control-plane listener port.
pub const DEFAULT_SERVER_PORT: u16 = 8765;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Control-plane listener port on the display.
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    /// Address the control-plane listener binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Human-readable name announced by this device.
    #[serde(default = "default_device_name")]
    pub device_name: String,

    /// Command used to open a destination in the maps application.
    /// `None` selects the platform default handler.
    #[serde(default)]
    pub maps_open_command: Option<String>,

    /// Fallback command for a generic browser-capable handler.
    #[serde(default)]
    pub browser_open_command: Option<String>,

    /// Fixed timeout applied to every outbound HTTP call, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_device_name() -> String {
    "navlink-display".to_string()
}

fn default_http_timeout_secs() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: default_server_port(),
            bind_addr: default_bind_addr(),
            device_name: default_device_name(),
            maps_open_command: None,
            browser_open_command: None,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}
