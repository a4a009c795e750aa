//! Control-plane client port: what the sender needs from the transport.
//!
//! The port returns classified responses rather than raw status codes so
//! the delivery state machine stays independent of the HTTP client, and
//! transport failures are typed so retry policy can distinguish them from
//! remote rejections.

use async_trait::async_trait;
use thiserror::Error;

use crate::network::StatusReport;

/// Address of the paired display's control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub address: String,
    pub port: u16,
}

impl RemoteTarget {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

/// Transient transport-level failures; all of them feed the retry policy.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}

/// Classified outcome of `POST /open-url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenUrlResponse {
    /// 2xx - the display accepted and opened the destination.
    Accepted,
    /// 401 - the presented token does not match.
    BadToken,
    /// 409 - the display reports it is not paired.
    RemoteUnpaired,
    /// 403 - refused by policy.
    Forbidden,
    /// Any other non-2xx status; assumed transient server-side.
    ServerError(u16),
}

#[async_trait]
pub trait ControlPlanePort: Send + Sync {
    /// Deliver one authenticated open-url request. A returned
    /// `OpenUrlResponse` means the remote answered; `TransportError` means
    /// it could not be reached.
    async fn open_url(
        &self,
        target: &RemoteTarget,
        token: &str,
        url: &str,
    ) -> Result<OpenUrlResponse, TransportError>;

    /// Fetch the unauthenticated status report.
    async fn fetch_status(&self, target: &RemoteTarget) -> Result<StatusReport, TransportError>;
}
