//! Wire-level models shared by the transports: control-plane bodies,
//! the status report, and the radio relay protocol.

pub mod control;
pub mod protocol;
pub mod status;

pub use control::{ControlReply, OpenUrlRequest};
pub use protocol::{RadioMessage, MAX_RADIO_LINE_BYTES, RADIO_SERVICE_ID, RADIO_SERVICE_NAME};
pub use status::StatusReport;
