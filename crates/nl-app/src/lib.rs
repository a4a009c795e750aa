//! # nl-app
//!
//! Use cases and delivery orchestration for Navlink: the display's token
//! service and the sender's command delivery state machine.

pub mod deps;
pub mod pair;
pub mod sender;
pub mod token_service;

pub use deps::AppDeps;
pub use pair::PairDevice;
pub use sender::{CommandSender, RetrySummary, StatusCheck};
pub use token_service::TokenService;
