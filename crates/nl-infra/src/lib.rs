//! # nl-infra
//!
//! Infrastructure adapters for Navlink: the JSON file-backed durable
//! state store, the configuration file repository, and the
//! process-spawning destination opener.

pub mod config;
pub mod opener;
pub mod store;

pub use config::FileConfigRepository;
pub use opener::ProcessOpener;
pub use store::FileStateStore;
