//! # nl-network
//!
//! Transport layer for Navlink: the display's control-plane HTTP server,
//! the sender's HTTP client, the short-link resolver, and the radio
//! socket relay protocol.

pub mod http;
pub mod radio;
pub mod resolver;

pub use http::client::HttpControlPlane;
pub use http::server::ControlPlaneServer;
pub use radio::display::RadioDisplay;
pub use radio::sender::RadioSender;
pub use resolver::ShortLinkResolver;
