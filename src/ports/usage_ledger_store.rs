//! Usage Ledger Store Port - Interface for persisting usage ledgers.
//!
//! Implementations must round-trip every ledger field exactly, dates
//! included, and must never leave a partially written ledger behind.

use async_trait::async_trait;

use crate::domain::foundation::{DeviceId, DomainError, ErrorCode};
use crate::domain::usage::UsageLedger;

/// Errors that can occur during ledger storage operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerStoreError {
    #[error("Failed to serialize ledger: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize ledger for device {device_id}: {reason}")]
    DeserializationFailed { device_id: DeviceId, reason: String },

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<LedgerStoreError> for DomainError {
    fn from(err: LedgerStoreError) -> Self {
        DomainError::new(ErrorCode::StorageError, err.to_string())
    }
}

/// Port for loading and saving a device's usage ledger
#[async_trait]
pub trait UsageLedgerStore: Send + Sync {
    /// Load the ledger for a device.
    ///
    /// Returns `None` on first use.
    async fn load(&self, device_id: &DeviceId) -> Result<Option<UsageLedger>, LedgerStoreError>;

    /// Replace the stored ledger for a device.
    ///
    /// Either the whole new ledger is stored or the old one is kept.
    async fn save(&self, device_id: &DeviceId, ledger: &UsageLedger)
        -> Result<(), LedgerStoreError>;
}
