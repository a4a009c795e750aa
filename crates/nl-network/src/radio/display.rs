//! Display role of the radio relay.
//!
//! One long-lived accept loop; each accepted connection gets its own
//! handler task. A connection must open with `HELLO` carrying the
//! display's current pairing code: a wrong code closes the connection
//! immediately, and any `OPEN_URL` arriving before a successful greeting
//! is dropped silently.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_util::codec::{Framed, LinesCodec};

use nl_core::network::protocol::{RadioMessage, MAX_RADIO_LINE_BYTES, RADIO_SERVICE_NAME};
use nl_core::pairing::PairingCode;
use nl_core::ports::OpenerPort;

pub struct RadioDisplay {
    code: PairingCode,
    opener: Arc<dyn OpenerPort>,
}

impl RadioDisplay {
    pub fn new(code: PairingCode, opener: Arc<dyn OpenerPort>) -> Self {
        Self { code, opener }
    }

    pub fn code(&self) -> &PairingCode {
        &self.code
    }

    /// Accept connections until the listener fails. Handlers run
    /// concurrently; the accept loop itself never blocks on a peer.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr().context("listener local_addr failed")?;
        info!("radio relay `{}` listening on {}", RADIO_SERVICE_NAME, addr);
        loop {
            let (stream, peer) = listener.accept().await.context("radio accept failed")?;
            debug!("radio connection from {}", peer);
            let display = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(e) = display.handle_connection(stream).await {
                    warn!("radio connection from {} ended with error: {:#}", peer, e);
                }
            });
        }
    }

    /// Drive one connection until the peer disconnects or fails the
    /// greeting. Written against a generic stream so tests can use an
    /// in-memory duplex pipe.
    pub async fn handle_connection<S>(&self, stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_RADIO_LINE_BYTES));
        let mut greeted = false;

        while let Some(line) = framed.next().await {
            let line = line.context("radio line read failed")?;
            let message = match RadioMessage::from_line(&line) {
                Ok(message) => message,
                Err(e) => {
                    warn!("ignoring malformed radio line: {}", e);
                    continue;
                }
            };

            match message {
                RadioMessage::Hello { code } => {
                    if self.code.matches(&code) {
                        debug!("radio greeting accepted");
                        greeted = true;
                    } else {
                        warn!("radio greeting with wrong code; closing connection");
                        return Ok(());
                    }
                }
                RadioMessage::OpenUrl { url } => {
                    if !greeted {
                        // Unauthenticated message: dropped, not an error.
                        debug!("dropping OPEN_URL before greeting");
                        continue;
                    }
                    self.open_destination(&url).await;
                }
            }
        }

        debug!("radio peer disconnected");
        Ok(())
    }

    /// Same effect as the HTTP open-url endpoint: maps handler first, one
    /// retry against the browser-capable fallback.
    async fn open_destination(&self, url: &str) {
        if let Err(maps_err) = self.opener.open_maps(url).await {
            warn!(
                "radio open: maps handler failed ({:#}), retrying with fallback handler",
                maps_err
            );
            if let Err(fallback_err) = self.opener.open_fallback(url).await {
                warn!("radio open: fallback handler failed: {:#}", fallback_err);
                return;
            }
        }
        info!("radio open: destination opened");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::AsyncWriteExt;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingOpener {
        opened: Mutex<Vec<String>>,
        maps_calls: AtomicUsize,
    }

    #[async_trait]
    impl OpenerPort for RecordingOpener {
        async fn open_maps(&self, url: &str) -> Result<()> {
            self.maps_calls.fetch_add(1, Ordering::SeqCst);
            self.opened.lock().await.push(url.to_string());
            Ok(())
        }

        async fn open_fallback(&self, _url: &str) -> Result<()> {
            Ok(())
        }
    }

    fn display_with(code: &str) -> (RadioDisplay, Arc<RecordingOpener>) {
        let opener = Arc::new(RecordingOpener::default());
        let display = RadioDisplay::new(PairingCode::parse(code).unwrap(), opener.clone());
        (display, opener)
    }

    #[tokio::test]
    async fn open_url_after_valid_hello_opens_destination() {
        let (display, opener) = display_with("042137");
        let (client, server) = tokio::io::duplex(1024);

        let handler = tokio::spawn(async move { display.handle_connection(server).await });

        let mut client = client;
        client
            .write_all(b"{\"type\":\"HELLO\",\"code\":\"042137\"}\n")
            .await
            .unwrap();
        client
            .write_all(b"{\"type\":\"OPEN_URL\",\"url\":\"https://maps.example/one\"}\n")
            .await
            .unwrap();
        drop(client);

        handler.await.unwrap().unwrap();
        assert_eq!(
            *opener.opened.lock().await,
            vec!["https://maps.example/one".to_string()]
        );
    }

    #[tokio::test]
    async fn wrong_code_closes_connection_before_any_open() {
        let (display, opener) = display_with("042137");
        let (client, server) = tokio::io::duplex(1024);

        let handler = tokio::spawn(async move { display.handle_connection(server).await });

        let mut client = client;
        client
            .write_all(b"{\"type\":\"HELLO\",\"code\":\"999999\"}\n")
            .await
            .unwrap();
        // Even if the peer keeps talking, nothing is processed; the write
        // may fail once the display has already closed its side.
        let _ = client
            .write_all(b"{\"type\":\"OPEN_URL\",\"url\":\"https://maps.example/one\"}\n")
            .await;
        drop(client);

        handler.await.unwrap().unwrap();
        assert_eq!(opener.maps_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn open_url_before_hello_is_silently_dropped() {
        let (display, opener) = display_with("042137");
        let (client, server) = tokio::io::duplex(1024);

        let handler = tokio::spawn(async move { display.handle_connection(server).await });

        let mut client = client;
        client
            .write_all(b"{\"type\":\"OPEN_URL\",\"url\":\"https://maps.example/early\"}\n")
            .await
            .unwrap();
        client
            .write_all(b"{\"type\":\"HELLO\",\"code\":\"042137\"}\n")
            .await
            .unwrap();
        client
            .write_all(b"{\"type\":\"OPEN_URL\",\"url\":\"https://maps.example/late\"}\n")
            .await
            .unwrap();
        drop(client);

        handler.await.unwrap().unwrap();
        assert_eq!(
            *opener.opened.lock().await,
            vec!["https://maps.example/late".to_string()]
        );
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let (display, opener) = display_with("042137");
        let (client, server) = tokio::io::duplex(1024);

        let handler = tokio::spawn(async move { display.handle_connection(server).await });

        let mut client = client;
        client
            .write_all(b"{\"type\":\"HELLO\",\"code\":\"042137\"}\n")
            .await
            .unwrap();
        client.write_all(b"garbage line\n").await.unwrap();
        client
            .write_all(b"{\"type\":\"OPEN_URL\",\"url\":\"https://maps.example/one\"}\n")
            .await
            .unwrap();
        drop(client);

        handler.await.unwrap().unwrap();
        assert_eq!(opener.maps_calls.load(Ordering::SeqCst), 1);
    }
}
