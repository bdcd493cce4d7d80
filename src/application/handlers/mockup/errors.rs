//! Mockup workflow errors.

use crate::domain::foundation::DomainError;
use crate::domain::paywall::PaywallError;
use crate::ports::{GenerationError, LedgerStoreError};

/// Errors from generating or exporting a mockup.
///
/// Entitlement denials are not errors; they come back as a blocked outcome.
#[derive(Debug, thiserror::Error)]
pub enum MockupError {
    /// Bad input. Nothing was counted.
    #[error(transparent)]
    Input(#[from] PaywallError),

    /// The ledger could not be saved. The in-memory ledger is unchanged.
    #[error(transparent)]
    Storage(#[from] LedgerStoreError),

    /// The generator failed after the mockup was counted.
    #[error("Failed to generate ad mockup: {0}")]
    Generation(#[from] GenerationError),
}

impl From<MockupError> for DomainError {
    fn from(err: MockupError) -> Self {
        match err {
            MockupError::Input(e) => e.into(),
            MockupError::Storage(e) => e.into(),
            MockupError::Generation(e) => e.into(),
        }
    }
}
