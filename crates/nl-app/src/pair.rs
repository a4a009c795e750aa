//! Pairing use case: turn a scanned payload into a saved pairing record.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use nl_core::pairing::{PairingPayload, PairingRecord};
use nl_core::ports::PairingRecordPort;

pub struct PairDevice {
    record: Arc<dyn PairingRecordPort>,
}

impl PairDevice {
    pub fn new(record: Arc<dyn PairingRecordPort>) -> Self {
        Self { record }
    }

    /// Parse the out-of-band payload (JSON or URI form) and persist a
    /// fresh pairing record. A malformed payload is a local failure
    /// reported to the caller; nothing is stored in that case.
    pub async fn pair_from_payload(&self, raw: &str) -> Result<PairingRecord> {
        let payload = PairingPayload::parse(raw).context("pairing payload rejected")?;
        let record = PairingRecord::from_payload(&payload);
        self.record.store(&record).await?;
        info!(
            "paired with display {}:{} (token hint {})",
            record.address,
            record.port,
            nl_core::pairing::PairingToken::new(record.token.clone()).hint()
        );
        Ok(record)
    }
}
