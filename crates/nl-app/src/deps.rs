//! Dependency grouping for application construction.
//!
//! Not a builder: no build steps, no defaults, no hidden logic. Just a
//! struct that groups the ports the use cases need, so the composition
//! root hands over one value instead of six.

use std::sync::Arc;

use nl_core::ports::{
    ControlPlanePort, OpenerPort, PairingRecordPort, PendingQueuePort, ResolveCachePort,
    TokenStorePort,
};

pub struct AppDeps {
    // Durable state
    pub token_store: Arc<dyn TokenStorePort>,
    pub pairing_record: Arc<dyn PairingRecordPort>,
    pub pending_queue: Arc<dyn PendingQueuePort>,
    pub resolve_cache: Arc<dyn ResolveCachePort>,

    // Display-side effect
    pub opener: Arc<dyn OpenerPort>,

    // Sender-side transport
    pub control_plane: Arc<dyn ControlPlanePort>,
}
