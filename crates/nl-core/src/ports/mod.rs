//! Port interfaces between use cases and infrastructure.
//!
//! Ports define the contract between the application logic and the
//! adapters that implement it (file store, HTTP client, process opener),
//! keeping the core independent of concrete I/O.

pub mod control_plane;
pub mod opener;
pub mod store;
pub mod token_authority;

pub use control_plane::{ControlPlanePort, OpenUrlResponse, RemoteTarget, TransportError};
pub use opener::OpenerPort;
pub use store::{PairingRecordPort, PendingQueuePort, ResolveCachePort, TokenStorePort};
pub use token_authority::TokenAuthorityPort;
