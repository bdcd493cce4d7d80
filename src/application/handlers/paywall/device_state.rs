//! DeviceState - the ledger and paywall session owned by one device.

use chrono::NaiveDate;

use crate::domain::foundation::DeviceId;
use crate::domain::paywall::PaywallSession;
use crate::domain::usage::UsageLedger;
use crate::ports::{LedgerStoreError, UsageLedgerStore};

/// Caller-owned state for a single device.
///
/// Handlers take `&mut DeviceState`, so at most one mutation is in flight per
/// device. The ledger is only replaced after the store accepted the new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub device_id: DeviceId,
    pub ledger: UsageLedger,
    pub session: PaywallSession,
}

impl DeviceState {
    pub fn new(device_id: DeviceId, ledger: UsageLedger) -> Self {
        Self {
            device_id,
            ledger,
            session: PaywallSession::new(),
        }
    }

    /// Load the device's ledger, creating and saving a free one on first use.
    pub async fn restore(
        store: &dyn UsageLedgerStore,
        device_id: DeviceId,
        today: NaiveDate,
    ) -> Result<Self, LedgerStoreError> {
        let ledger = match store.load(&device_id).await? {
            Some(ledger) => ledger,
            None => {
                let ledger = UsageLedger::new_free(today);
                store.save(&device_id, &ledger).await?;
                tracing::info!(device_id = %device_id, "Created usage ledger");
                ledger
            }
        };

        Ok(Self::new(device_id, ledger))
    }

    /// Persist `next`, then make it the in-memory ledger.
    ///
    /// On failure the current ledger is left as it was.
    pub async fn commit(
        &mut self,
        store: &dyn UsageLedgerStore,
        next: UsageLedger,
    ) -> Result<(), LedgerStoreError> {
        if let Err(e) = store.save(&self.device_id, &next).await {
            tracing::error!(device_id = %self.device_id, error = %e, "Failed to persist usage ledger");
            return Err(e);
        }
        self.ledger = next;
        Ok(())
    }
}
