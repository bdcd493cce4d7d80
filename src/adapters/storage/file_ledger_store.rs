//! File-based Usage Ledger Store
//!
//! Stores one YAML file per device under a base directory. Writes go to a
//! temporary sibling first and are renamed into place, so a crash mid-write
//! leaves the previous ledger intact.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::foundation::DeviceId;
use crate::domain::usage::UsageLedger;
use crate::ports::{LedgerStoreError, UsageLedgerStore};

/// File-based storage for usage ledgers
#[derive(Debug, Clone)]
pub struct FileLedgerStore {
    base_path: PathBuf,
}

impl FileLedgerStore {
    /// Create a new file store rooted at `base_path`.
    ///
    /// The directory is created on first save.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn ledger_path(&self, device_id: &DeviceId) -> PathBuf {
        self.base_path.join(format!("{}.yaml", device_id.as_str()))
    }

    fn temp_path(&self, device_id: &DeviceId) -> PathBuf {
        self.base_path
            .join(format!(".{}.yaml.tmp", device_id.as_str()))
    }
}

#[async_trait]
impl UsageLedgerStore for FileLedgerStore {
    async fn load(&self, device_id: &DeviceId) -> Result<Option<UsageLedger>, LedgerStoreError> {
        let yaml = match fs::read_to_string(self.ledger_path(device_id)).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LedgerStoreError::IoError(e.to_string())),
        };

        let ledger = serde_yaml::from_str(&yaml).map_err(|e| {
            tracing::warn!(device_id = %device_id, error = %e, "Corrupt usage ledger file");
            LedgerStoreError::DeserializationFailed {
                device_id: device_id.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Some(ledger))
    }

    async fn save(&self, device_id: &DeviceId, ledger: &UsageLedger) -> Result<(), LedgerStoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| LedgerStoreError::IoError(e.to_string()))?;

        let yaml = serde_yaml::to_string(ledger)
            .map_err(|e| LedgerStoreError::SerializationFailed(e.to_string()))?;

        let temp_path = self.temp_path(device_id);
        fs::write(&temp_path, yaml)
            .await
            .map_err(|e| LedgerStoreError::IoError(e.to_string()))?;

        fs::rename(&temp_path, self.ledger_path(device_id))
            .await
            .map_err(|e| LedgerStoreError::IoError(e.to_string()))?;

        tracing::debug!(
            device_id = %device_id,
            daily_count = ledger.daily_count,
            lifetime_count = ledger.lifetime_count,
            "Usage ledger saved"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::plan::PlanTier;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn device(id: &str) -> DeviceId {
        DeviceId::new(id).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn load_missing_ledger_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileLedgerStore::new(temp_dir.path());

        assert!(store.load(&device("fresh")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_and_load_roundtrips_every_field() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileLedgerStore::new(temp_dir.path().join("ledgers"));
        let id = device("device-1");

        let now = Timestamp::from_unix_secs(1_767_225_600).unwrap();
        let ledger = UsageLedger::new_free(date(2026, 1, 1))
            .record_generation(date(2026, 1, 1))
            .record_generation(date(2026, 1, 1))
            .start_trial(now, 7);

        store.save(&id, &ledger).await.unwrap();
        let loaded = store.load(&id).await.unwrap().unwrap();

        assert_eq!(loaded, ledger);
        assert_eq!(loaded.plan_tier, PlanTier::Pro);
        assert_eq!(loaded.last_reset_date, date(2026, 1, 1));
    }

    #[tokio::test]
    async fn save_replaces_previous_ledger() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileLedgerStore::new(temp_dir.path());
        let id = device("device-1");
        let today = date(2026, 3, 4);

        let first = UsageLedger::new_free(today);
        store.save(&id, &first).await.unwrap();
        let second = first.record_generation(today);
        store.save(&id, &second).await.unwrap();

        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded.daily_count, 1);
        assert!(!store.temp_path(&id).exists());
    }

    #[tokio::test]
    async fn devices_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileLedgerStore::new(temp_dir.path());
        let today = date(2026, 3, 4);

        store
            .save(&device("a"), &UsageLedger::new_free(today).record_generation(today))
            .await
            .unwrap();

        assert!(store.load(&device("b")).await.unwrap().is_none());
        assert!(store.ledger_path(&device("a")).exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_deserialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileLedgerStore::new(temp_dir.path());
        let id = device("broken");

        std::fs::write(store.ledger_path(&id), "plan_tier: [not, a, tier]\n").unwrap();

        let result = store.load(&id).await;
        assert!(matches!(
            result,
            Err(LedgerStoreError::DeserializationFailed { .. })
        ));
    }
}
