//! Sender-side delivery state machine.
//!
//! `send_command` drives one authenticated delivery with bounded retry;
//! transient failures end in the durable pending queue, authentication
//! failures are permanent and never queued. State is an explicit value
//! published through a watch channel, so overlapping sends cannot race on
//! a shared field and observers see every terminal transition.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::time::sleep;

use nl_core::command::{Command, DeliveryState, SendOutcome};
use nl_core::pairing::{PairingRecord, PairingToken};
use nl_core::ports::{
    ControlPlanePort, OpenUrlResponse, PairingRecordPort, PendingQueuePort, RemoteTarget,
    TransportError,
};

/// Attempts per send, including the first.
const SEND_ATTEMPTS: u32 = 3;

/// Fixed delay between attempts within one send.
const SEND_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Aggregate result of one `retry_pending` drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrySummary {
    pub attempted: usize,
    pub delivered: usize,
    pub failed_permanently: usize,
    pub still_pending: usize,
}

/// Result of an unauthenticated status probe against the paired display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCheck {
    /// No usable pairing record exists.
    NotPaired,
    /// Hints match and the remote reports paired.
    Verified,
    /// The remote is reachable but reports it is not paired.
    RemoteUnpaired,
    /// The remote's token hint differs from ours; re-pairing is required.
    TokenMismatch,
    /// The remote could not be reached.
    Unreachable(String),
}

pub struct CommandSender {
    record: Arc<dyn PairingRecordPort>,
    queue: Arc<dyn PendingQueuePort>,
    control: Arc<dyn ControlPlanePort>,
    state_tx: watch::Sender<DeliveryState>,
    retry_delay: Duration,
}

impl CommandSender {
    pub fn new(
        record: Arc<dyn PairingRecordPort>,
        queue: Arc<dyn PendingQueuePort>,
        control: Arc<dyn ControlPlanePort>,
    ) -> Self {
        let (state_tx, _) = watch::channel(DeliveryState::Unpaired);
        Self {
            record,
            queue,
            control,
            state_tx,
            retry_delay: SEND_RETRY_DELAY,
        }
    }

    /// Override the fixed retry delay (tests use a near-zero delay).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Observe delivery-state transitions.
    pub fn subscribe(&self) -> watch::Receiver<DeliveryState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> DeliveryState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, state: DeliveryState) {
        self.state_tx.send_replace(state);
    }

    /// Deliver one command to the paired display.
    ///
    /// Returns the structured terminal outcome; intermediate retry
    /// attempts are not surfaced. Store failures are the only errors.
    pub async fn send_command(&self, url: &str) -> Result<SendOutcome> {
        self.send(Command::new(url)).await
    }

    /// Deliver an already-built command.
    pub async fn send(&self, command: Command) -> Result<SendOutcome> {
        let url = command.destination_url.as_str();
        let record = match self.record.load().await? {
            Some(record) if record.paired => record,
            _ => {
                self.set_state(DeliveryState::Unpaired);
                debug!("send refused: not paired");
                return Ok(SendOutcome::rejected("not paired with a display"));
            }
        };

        if !record.has_credentials() {
            // Paired flag without credentials is a broken record; treat it
            // like an authentication failure so the operator re-pairs.
            self.set_state(DeliveryState::AuthFailed);
            warn!("send refused: pairing record is missing address or token");
            return Ok(SendOutcome::auth_failed(
                "pairing record is missing address or token",
            ));
        }

        self.set_state(DeliveryState::Connecting);
        let target = RemoteTarget::new(record.address.clone(), record.port);

        let mut last_error: Option<TransportError> = None;
        for attempt in 0..SEND_ATTEMPTS {
            if attempt > 0 {
                sleep(self.retry_delay).await;
                debug!("send retry {} for {}", attempt, url);
            }

            match self.control.open_url(&target, &record.token, url).await {
                Ok(OpenUrlResponse::Accepted) => {
                    self.set_state(DeliveryState::Connected);
                    self.save_verified(record, true).await?;
                    info!("command delivered: {}", url);
                    return Ok(SendOutcome::delivered());
                }
                Ok(OpenUrlResponse::BadToken) => {
                    return self
                        .auth_failure(record, "display rejected the pairing token")
                        .await;
                }
                Ok(OpenUrlResponse::RemoteUnpaired) => {
                    return self
                        .auth_failure(record, "display reports it is not paired")
                        .await;
                }
                Ok(OpenUrlResponse::Forbidden) => {
                    // Refused by policy: permanent, never queued.
                    self.set_state(DeliveryState::AuthFailed);
                    self.save_verified(record, false).await?;
                    warn!("send refused by display policy");
                    return Ok(SendOutcome::rejected("display refused the request"));
                }
                Ok(OpenUrlResponse::ServerError(code)) => {
                    // The display answered but could not act; assumed
                    // transient on the server side, so queue for later.
                    self.set_state(DeliveryState::Offline);
                    self.queue.append(url).await?;
                    warn!("display answered HTTP {}; command queued", code);
                    return Ok(SendOutcome::queued(format!(
                        "display answered HTTP {}",
                        code
                    )));
                }
                Err(transport) => {
                    debug!("send attempt {} failed: {}", attempt + 1, transport);
                    last_error = Some(transport);
                }
            }
        }

        self.set_state(DeliveryState::Offline);
        self.queue.append(url).await?;
        let reason = match last_error {
            Some(e) => format!("delivery failed after {} attempts: {}", SEND_ATTEMPTS, e),
            None => format!("delivery failed after {} attempts", SEND_ATTEMPTS),
        };
        warn!(
            "{}; command from {} queued for later delivery",
            reason, command.enqueued_at
        );
        Ok(SendOutcome::queued(reason))
    }

    async fn auth_failure(&self, record: PairingRecord, reason: &str) -> Result<SendOutcome> {
        self.set_state(DeliveryState::AuthFailed);
        self.save_verified(record, false).await?;
        warn!("send failed permanently: {}", reason);
        Ok(SendOutcome::auth_failed(reason))
    }

    async fn save_verified(&self, mut record: PairingRecord, verified: bool) -> Result<()> {
        if verified {
            record.mark_verified();
        } else {
            record.clear_verified();
        }
        self.record.store(&record).await
    }

    /// Drain the pending queue opportunistically.
    ///
    /// The queue is snapshotted once, every entry is sent concurrently,
    /// and an entry is removed only when it was delivered or failed
    /// permanently. Completion is the single join over all entries, so
    /// the aggregate is reported exactly once.
    pub async fn retry_pending(&self) -> Result<RetrySummary> {
        let snapshot = self.queue.list().await?;
        if snapshot.is_empty() {
            debug!("retry: pending queue empty");
            return Ok(RetrySummary::default());
        }

        info!("retry: draining {} pending command(s)", snapshot.len());
        let outcomes = join_all(
            snapshot
                .iter()
                .map(|url| async move { (url.clone(), self.send_command(url).await) }),
        )
        .await;

        let mut summary = RetrySummary {
            attempted: snapshot.len(),
            ..RetrySummary::default()
        };
        for (url, outcome) in outcomes {
            match outcome {
                Ok(outcome) if outcome.delivered => {
                    self.queue.remove(&url).await?;
                    summary.delivered += 1;
                }
                Ok(outcome) if outcome.is_settled() => {
                    // Permanent failure: resolving it means removing the
                    // entry; retrying cannot succeed.
                    self.queue.remove(&url).await?;
                    summary.failed_permanently += 1;
                }
                Ok(_) => {
                    // Re-queued by send_command; left in place.
                    summary.still_pending += 1;
                }
                Err(e) => {
                    warn!("retry of {} hit a store error: {:#}", url, e);
                    summary.still_pending += 1;
                }
            }
        }

        info!(
            "retry finished: {} delivered, {} failed permanently, {} still pending",
            summary.delivered, summary.failed_permanently, summary.still_pending
        );
        Ok(summary)
    }

    /// Unauthenticated reachability and token-hint probe. Raw tokens are
    /// never compared over the wire; only the hints are.
    pub async fn check_status(&self) -> Result<StatusCheck> {
        let record = match self.record.load().await? {
            Some(record) if record.paired => record,
            _ => {
                self.set_state(DeliveryState::Unpaired);
                return Ok(StatusCheck::NotPaired);
            }
        };

        let target = RemoteTarget::new(record.address.clone(), record.port);
        let status = match self.control.fetch_status(&target).await {
            Ok(status) => status,
            Err(e) => {
                self.set_state(DeliveryState::Offline);
                return Ok(StatusCheck::Unreachable(e.to_string()));
            }
        };

        if !status.paired {
            self.set_state(DeliveryState::Pairing);
            return Ok(StatusCheck::RemoteUnpaired);
        }

        let local_hint = PairingToken::new(record.token.clone()).hint();
        if status.token_hint == local_hint {
            self.set_state(DeliveryState::Connected);
            self.save_verified(record, true).await?;
            Ok(StatusCheck::Verified)
        } else {
            self.set_state(DeliveryState::AuthFailed);
            self.save_verified(record, false).await?;
            Ok(StatusCheck::TokenMismatch)
        }
    }
}
