//! Application configuration model.

pub mod app_config;

pub use app_config::{AppConfig, DEFAULT_SERVER_PORT};
