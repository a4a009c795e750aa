//! End-to-end hand-off: a real control-plane server on loopback, a real
//! HTTP client, and the file-backed store on both sides.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use nl_app::{CommandSender, PairDevice, StatusCheck, TokenService};
use nl_core::command::DeliveryState;
use nl_core::pairing::PairingPayload;
use nl_core::ports::{OpenerPort, PairingRecordPort, PendingQueuePort};
use nl_infra::FileStateStore;
use nl_network::{ControlPlaneServer, HttpControlPlane};
use tempfile::TempDir;

const MAPS_URL: &str = "https://www.google.com/maps/search/?api=1&query=Bangkok";

#[derive(Default)]
struct CountingOpener {
    opened: AtomicUsize,
    last_url: Mutex<Option<String>>,
}

#[async_trait]
impl OpenerPort for CountingOpener {
    async fn open_maps(&self, url: &str) -> Result<()> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().await = Some(url.to_string());
        Ok(())
    }

    async fn open_fallback(&self, _url: &str) -> Result<()> {
        Ok(())
    }
}

struct Display {
    tokens: Arc<TokenService>,
    opener: Arc<CountingOpener>,
    port: u16,
    _dir: TempDir,
}

async fn start_display() -> Display {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(
        FileStateStore::open(dir.path().join("display.json"))
            .await
            .unwrap(),
    );
    let tokens = Arc::new(TokenService::new(store));
    let opener = Arc::new(CountingOpener::default());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = ControlPlaneServer::new(tokens.clone(), opener.clone(), port);
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    Display {
        tokens,
        opener,
        port,
        _dir: dir,
    }
}

struct Sender {
    store: Arc<FileStateStore>,
    sender: CommandSender,
    _dir: TempDir,
}

async fn pair_sender_with(display: &Display) -> Sender {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(
        FileStateStore::open(dir.path().join("sender.json"))
            .await
            .unwrap(),
    );

    let token = display.tokens.get_token().await.unwrap();
    let payload = PairingPayload::new("127.0.0.1", display.port, token.as_str());
    PairDevice::new(store.clone())
        .pair_from_payload(&payload.to_json())
        .await
        .unwrap();

    let control = Arc::new(HttpControlPlane::new(Duration::from_secs(2)).unwrap());
    let sender = CommandSender::new(store.clone(), store.clone(), control)
        .with_retry_delay(Duration::from_millis(10));

    Sender {
        store,
        sender,
        _dir: dir,
    }
}

#[tokio::test]
async fn paired_sender_delivers_and_verifies() {
    let display = start_display().await;
    let side = pair_sender_with(&display).await;

    let outcome = side.sender.send_command(MAPS_URL).await.unwrap();
    assert!(outcome.delivered);
    assert_eq!(side.sender.state(), DeliveryState::Connected);

    // The display opened exactly this destination and marked itself paired.
    assert_eq!(display.opener.opened.load(Ordering::SeqCst), 1);
    assert_eq!(
        display.opener.last_url.lock().await.clone(),
        Some(MAPS_URL.to_string())
    );
    assert!(display.tokens.paired().await.unwrap());

    // Sender side: verified, nothing queued.
    let record = PairingRecordPort::load(side.store.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert!(record.verified);
    assert!(PendingQueuePort::list(side.store.as_ref())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn rotated_token_turns_sends_into_auth_failures() {
    let display = start_display().await;
    let side = pair_sender_with(&display).await;

    // First send verifies the pairing.
    assert!(side.sender.send_command(MAPS_URL).await.unwrap().delivered);

    // Rotate the display token behind the sender's back.
    display.tokens.refresh().await.unwrap();
    assert!(!display.tokens.paired().await.unwrap());

    let outcome = side.sender.send_command(MAPS_URL).await.unwrap();
    assert!(outcome.auth_failed);
    assert!(!outcome.queued);
    assert_eq!(side.sender.state(), DeliveryState::AuthFailed);

    let record = PairingRecordPort::load(side.store.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert!(!record.verified);
    assert!(PendingQueuePort::list(side.store.as_ref())
        .await
        .unwrap()
        .is_empty());

    // The stale destination was not opened a second time.
    assert_eq!(display.opener.opened.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn status_check_detects_token_rotation() {
    let display = start_display().await;
    let side = pair_sender_with(&display).await;

    assert_eq!(
        side.sender.check_status().await.unwrap(),
        StatusCheck::RemoteUnpaired
    );

    // A delivered command marks the display paired; the hint then matches.
    side.sender.send_command(MAPS_URL).await.unwrap();
    assert_eq!(
        side.sender.check_status().await.unwrap(),
        StatusCheck::Verified
    );

    display.tokens.refresh().await.unwrap();
    // Rotation clears the display's paired flag first.
    assert_eq!(
        side.sender.check_status().await.unwrap(),
        StatusCheck::RemoteUnpaired
    );
}

#[tokio::test]
async fn offline_display_queues_then_drains_after_restart() {
    let display = start_display().await;
    let side = pair_sender_with(&display).await;

    // Point the sender at a dead port to simulate the display being away.
    let dead = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_port = dead.local_addr().unwrap().port();
    drop(dead);

    let mut record = PairingRecordPort::load(side.store.as_ref())
        .await
        .unwrap()
        .unwrap();
    let live_port = record.port;
    record.port = dead_port;
    PairingRecordPort::store(side.store.as_ref(), &record)
        .await
        .unwrap();

    let outcome = side.sender.send_command(MAPS_URL).await.unwrap();
    assert!(outcome.queued);
    assert_eq!(
        PendingQueuePort::list(side.store.as_ref()).await.unwrap(),
        vec![MAPS_URL.to_string()]
    );

    // The display comes back; draining the queue delivers and clears it.
    record.port = live_port;
    PairingRecordPort::store(side.store.as_ref(), &record)
        .await
        .unwrap();

    let summary = side.sender.retry_pending().await.unwrap();
    assert_eq!(summary.delivered, 1);
    assert!(PendingQueuePort::list(side.store.as_ref())
        .await
        .unwrap()
        .is_empty());
    assert_eq!(display.opener.opened.load(Ordering::SeqCst), 1);
}
