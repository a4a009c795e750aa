//! Pairing domain: the shared-secret trust model between sender and display.

pub mod code;
pub mod payload;
pub mod record;
pub mod token;

pub use code::PairingCode;
pub use payload::{PairingPayload, PayloadError};
pub use record::PairingRecord;
pub use token::PairingToken;
