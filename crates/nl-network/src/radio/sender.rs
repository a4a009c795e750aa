//! Sender role of the radio relay.
//!
//! The connection is established lazily on the first send: `HELLO` with
//! the operator-entered code goes out first, then any number of
//! `OPEN_URL` messages reuse the same connection. A dropped socket is a
//! normal condition; the next send reconnects.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::SinkExt;
use log::{debug, info, warn};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::{Framed, LinesCodec};

use nl_core::network::protocol::{RadioMessage, MAX_RADIO_LINE_BYTES};
use nl_core::pairing::PairingCode;

type RadioConnection = Framed<TcpStream, LinesCodec>;

pub struct RadioSender {
    target: String,
    code: PairingCode,
    connection: Arc<Mutex<Option<RadioConnection>>>,
}

impl RadioSender {
    /// `target` is the socket address of the display's radio listener.
    pub fn new(target: impl Into<String>, code: PairingCode) -> Self {
        Self {
            target: target.into(),
            code,
            connection: Arc::new(Mutex::new(None)),
        }
    }

    /// Send one open-url command, connecting first if needed. On a write
    /// failure the connection is discarded so the next send starts fresh.
    pub async fn send_open_url(&self, url: &str) -> Result<()> {
        let mut guard = self.connection.lock().await;

        if guard.is_none() {
            *guard = Some(self.connect_and_greet().await?);
        }

        let line = RadioMessage::OpenUrl {
            url: url.to_string(),
        }
        .to_line()?;

        if let Some(connection) = guard.as_mut() {
            if let Err(e) = connection.send(line).await {
                warn!("radio send failed; dropping connection: {}", e);
                *guard = None;
                return Err(e).context("radio send failed");
            }
            info!("radio: open-url sent");
        }
        Ok(())
    }

    /// Drop the connection; the next send will reconnect lazily.
    pub async fn disconnect(&self) {
        let mut guard = self.connection.lock().await;
        *guard = None;
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    async fn connect_and_greet(&self) -> Result<RadioConnection> {
        debug!("radio: connecting to {}", self.target);
        let stream = TcpStream::connect(&self.target)
            .await
            .with_context(|| format!("radio connect to {} failed", self.target))?;
        let mut connection =
            Framed::new(stream, LinesCodec::new_with_max_length(MAX_RADIO_LINE_BYTES));

        let hello = RadioMessage::Hello {
            code: self.code.as_str().to_string(),
        }
        .to_line()?;
        connection
            .send(hello)
            .await
            .context("radio greeting failed")?;

        info!("radio: connected to {}", self.target);
        Ok(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio::net::TcpListener;

    async fn read_lines(listener: &TcpListener, count: usize) -> Vec<String> {
        let (stream, _) = listener.accept().await.unwrap();
        let mut framed = Framed::new(stream, LinesCodec::new());
        let mut lines = Vec::new();
        for _ in 0..count {
            lines.push(framed.next().await.unwrap().unwrap());
        }
        lines
    }

    #[tokio::test]
    async fn first_send_greets_then_delivers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let reader = tokio::spawn(async move { read_lines(&listener, 3).await });

        let sender = RadioSender::new(addr.to_string(), PairingCode::parse("042137").unwrap());
        assert!(!sender.is_connected().await);

        sender
            .send_open_url("https://maps.example/one")
            .await
            .unwrap();
        sender
            .send_open_url("https://maps.example/two")
            .await
            .unwrap();
        assert!(sender.is_connected().await);

        let lines = reader.await.unwrap();
        assert_eq!(
            RadioMessage::from_line(&lines[0]).unwrap(),
            RadioMessage::Hello {
                code: "042137".to_string()
            }
        );
        assert_eq!(
            RadioMessage::from_line(&lines[1]).unwrap(),
            RadioMessage::OpenUrl {
                url: "https://maps.example/one".to_string()
            }
        );
        assert_eq!(
            RadioMessage::from_line(&lines[2]).unwrap(),
            RadioMessage::OpenUrl {
                url: "https://maps.example/two".to_string()
            }
        );
    }

    #[tokio::test]
    async fn unreachable_display_is_an_error_not_a_panic() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sender = RadioSender::new(addr.to_string(), PairingCode::parse("042137").unwrap());
        assert!(sender
            .send_open_url("https://maps.example/one")
            .await
            .is_err());
        assert!(!sender.is_connected().await);
    }

    #[tokio::test]
    async fn reconnects_lazily_after_disconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let sender = RadioSender::new(addr.to_string(), PairingCode::parse("042137").unwrap());

        let reader = tokio::spawn(async move {
            // First connection: greeting plus one command.
            let first = read_lines(&listener, 2).await;
            // Second connection after the sender dropped the first.
            let second = read_lines(&listener, 2).await;
            (first, second)
        });

        sender
            .send_open_url("https://maps.example/one")
            .await
            .unwrap();
        sender.disconnect().await;
        assert!(!sender.is_connected().await);
        sender
            .send_open_url("https://maps.example/two")
            .await
            .unwrap();

        let (first, second) = reader.await.unwrap();
        assert!(first[0].contains("HELLO"));
        assert!(first[1].contains("https://maps.example/one"));
        assert!(second[0].contains("HELLO"));
        assert!(second[1].contains("https://maps.example/two"));
    }
}
