//! In-Memory Usage Ledger Store
//!
//! Keeps ledgers in a shared map. Used by tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::DeviceId;
use crate::domain::usage::UsageLedger;
use crate::ports::{LedgerStoreError, UsageLedgerStore};

/// In-memory storage for usage ledgers
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    ledgers: Arc<RwLock<HashMap<DeviceId, UsageLedger>>>,
    fail_saves: Arc<AtomicBool>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail with an IO error.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Seed a ledger directly.
    pub async fn insert(&self, device_id: DeviceId, ledger: UsageLedger) {
        self.ledgers.write().await.insert(device_id, ledger);
    }

    pub async fn get(&self, device_id: &DeviceId) -> Option<UsageLedger> {
        self.ledgers.read().await.get(device_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.ledgers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ledgers.read().await.is_empty()
    }
}

#[async_trait]
impl UsageLedgerStore for InMemoryLedgerStore {
    async fn load(&self, device_id: &DeviceId) -> Result<Option<UsageLedger>, LedgerStoreError> {
        Ok(self.ledgers.read().await.get(device_id).cloned())
    }

    async fn save(&self, device_id: &DeviceId, ledger: &UsageLedger) -> Result<(), LedgerStoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(LedgerStoreError::IoError("simulated write failure".to_string()));
        }
        self.ledgers
            .write()
            .await
            .insert(device_id.clone(), ledger.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = InMemoryLedgerStore::new();
        let id = DeviceId::new("device-1").unwrap();
        let ledger = UsageLedger::new_free(today()).record_generation(today());

        store.save(&id, &ledger).await.unwrap();

        assert_eq!(store.load(&id).await.unwrap(), Some(ledger));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_device_loads_none() {
        let store = InMemoryLedgerStore::new();
        let id = DeviceId::new("nobody").unwrap();
        assert!(store.load(&id).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_ledger() {
        let store = InMemoryLedgerStore::new();
        let id = DeviceId::new("device-1").unwrap();
        let original = UsageLedger::new_free(today());
        store.save(&id, &original).await.unwrap();

        store.fail_saves(true);
        let result = store.save(&id, &original.clone().record_generation(today())).await;

        assert!(matches!(result, Err(LedgerStoreError::IoError(_))));
        assert_eq!(store.get(&id).await, Some(original));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryLedgerStore::new();
        let handle = store.clone();
        let id = DeviceId::new("shared").unwrap();

        store.save(&id, &UsageLedger::new_free(today())).await.unwrap();

        assert!(handle.get(&id).await.is_some());
    }
}
