//! # nl-core
//!
//! Core domain models and business logic for Navlink.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod command;
pub mod config;
pub mod link;
pub mod network;
pub mod pairing;
pub mod ports;

// Re-export commonly used types at the crate root
pub use command::{Command, DeliveryState, SendOutcome};
pub use config::AppConfig;
pub use network::{OpenUrlRequest, RadioMessage, StatusReport};
pub use pairing::{PairingCode, PairingPayload, PairingRecord, PairingToken};
