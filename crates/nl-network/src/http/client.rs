//! Sender-side control-plane HTTP client.
//!
//! Every call carries a fixed connect/read timeout; exceeding it is a
//! transient failure that feeds the sender's retry policy. Responses are
//! classified here so the delivery state machine never sees raw status
//! codes.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;

use nl_core::network::{ControlReply, OpenUrlRequest, StatusReport};
use nl_core::ports::{ControlPlanePort, OpenUrlResponse, RemoteTarget, TransportError};

/// Default fixed timeout for control-plane calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpControlPlane {
    client: reqwest::Client,
}

impl HttpControlPlane {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .context("build http client failed")?;
        Ok(Self { client })
    }

    pub fn with_default_timeout() -> Result<Self> {
        Self::new(DEFAULT_HTTP_TIMEOUT)
    }

    fn endpoint(target: &RemoteTarget, path: &str) -> String {
        format!("http://{}:{}{}", target.address, target.port, path)
    }

    /// Rotate the token of a co-resident display. This is not part of the
    /// sender's port: the endpoint only answers local callers.
    pub async fn refresh_local_token(&self, port: u16) -> Result<String> {
        let url = format!("http://127.0.0.1:{}/refresh-token", port);
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .context("refresh-token request failed")?;
        let status = response.status();
        let reply: ControlReply = response
            .json()
            .await
            .context("refresh-token reply parse failed")?;
        if !status.is_success() || !reply.ok {
            return Err(anyhow!("refresh-token rejected with HTTP {}", status));
        }
        reply
            .token
            .ok_or_else(|| anyhow!("refresh-token reply carried no token"))
    }
}

fn map_transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

#[async_trait]
impl ControlPlanePort for HttpControlPlane {
    async fn open_url(
        &self,
        target: &RemoteTarget,
        token: &str,
        url: &str,
    ) -> Result<OpenUrlResponse, TransportError> {
        let endpoint = Self::endpoint(target, "/open-url");
        debug!("POST {}", endpoint);
        let response = self
            .client
            .post(&endpoint)
            .json(&OpenUrlRequest {
                token: token.to_string(),
                url: url.to_string(),
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let classified = match response.status().as_u16() {
            200..=299 => OpenUrlResponse::Accepted,
            401 => OpenUrlResponse::BadToken,
            409 => OpenUrlResponse::RemoteUnpaired,
            403 => OpenUrlResponse::Forbidden,
            code => OpenUrlResponse::ServerError(code),
        };
        Ok(classified)
    }

    async fn fetch_status(&self, target: &RemoteTarget) -> Result<StatusReport, TransportError> {
        let endpoint = Self::endpoint(target, "/status");
        debug!("GET {}", endpoint);
        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(TransportError::Other(format!(
                "status endpoint answered HTTP {}",
                response.status()
            )));
        }
        response
            .json::<StatusReport>()
            .await
            .map_err(|e| TransportError::Other(format!("status reply parse failed: {}", e)))
    }
}
