//! Radio socket relay: the alternate point-to-point transport used when
//! the devices share no IP network.
//!
//! Both roles speak newline-delimited JSON (`nl_core::network::protocol`)
//! over any byte stream. The concrete socket is whatever the platform
//! offers for the radio link; deployments without one fall back to a TCP
//! socket, and tests drive the handler over an in-memory duplex stream.

pub mod display;
pub mod sender;

pub use display::RadioDisplay;
pub use sender::RadioSender;
