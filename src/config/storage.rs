//! Ledger storage configuration

use std::path::PathBuf;

use serde::Deserialize;

use super::error::ValidationError;

/// Where per-device usage ledgers are kept
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_ledger_dir")]
    pub ledger_dir: PathBuf,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ledger_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE_LEDGER_DIR"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            ledger_dir: default_ledger_dir(),
        }
    }
}

fn default_ledger_dir() -> PathBuf {
    PathBuf::from("./data/ledgers")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dir() {
        let config = StorageConfig::default();
        assert_eq!(config.ledger_dir, PathBuf::from("./data/ledgers"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_dir_is_invalid() {
        let config = StorageConfig {
            ledger_dir: PathBuf::new(),
        };
        assert!(config.validate().is_err());
    }
}
