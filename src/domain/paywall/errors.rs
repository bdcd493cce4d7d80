//! Paywall and mockup input errors.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | MissingUpload | 400 |
//! | InvalidUpload | 400 |
//! | MissingGeneratedImage | 409 |
//! | UnknownPlacement | 404 |
//! | InvalidState | 409 |

use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaywallError {
    /// Generate requested without an uploaded product image.
    MissingUpload,

    /// Upload present but unusable (empty, not an image).
    InvalidUpload { reason: String },

    /// Export requested before any mockup was generated.
    MissingGeneratedImage,

    /// Placement format id is not in the catalog.
    UnknownPlacement(String),

    /// Session operation not valid in the current phase.
    InvalidState { current: String, attempted: String },
}

impl PaywallError {
    pub fn invalid_upload(reason: impl Into<String>) -> Self {
        PaywallError::InvalidUpload {
            reason: reason.into(),
        }
    }

    pub fn unknown_placement(id: impl Into<String>) -> Self {
        PaywallError::UnknownPlacement(id.into())
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        PaywallError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PaywallError::MissingUpload => ErrorCode::MissingUpload,
            PaywallError::InvalidUpload { .. } => ErrorCode::ValidationFailed,
            PaywallError::MissingGeneratedImage => ErrorCode::MissingGeneratedImage,
            PaywallError::UnknownPlacement(_) => ErrorCode::UnknownPlacement,
            PaywallError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            PaywallError::MissingUpload => "Please upload a product image first".to_string(),
            PaywallError::InvalidUpload { reason } => format!("Invalid upload: {}", reason),
            PaywallError::MissingGeneratedImage => {
                "Generate a mockup before exporting".to_string()
            }
            PaywallError::UnknownPlacement(id) => format!("Unknown placement format: {}", id),
            PaywallError::InvalidState { current, attempted } => {
                format!("Cannot {} a paywall that is {}", attempted, current)
            }
        }
    }
}

impl std::fmt::Display for PaywallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PaywallError {}

impl From<PaywallError> for DomainError {
    fn from(err: PaywallError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_map_to_their_codes() {
        assert_eq!(PaywallError::MissingUpload.code(), ErrorCode::MissingUpload);
        assert_eq!(
            PaywallError::MissingGeneratedImage.code(),
            ErrorCode::MissingGeneratedImage
        );
        assert_eq!(
            PaywallError::unknown_placement("x").code(),
            ErrorCode::UnknownPlacement
        );
    }

    #[test]
    fn invalid_state_message_names_phase() {
        let err = PaywallError::invalid_state("closed", "select a plan on");
        assert_eq!(err.to_string(), "Cannot select a plan on a paywall that is closed");
    }

    #[test]
    fn converts_into_domain_error() {
        let err: DomainError = PaywallError::unknown_placement("moon-base").into();
        assert_eq!(err.code, ErrorCode::UnknownPlacement);
        assert!(err.message.contains("moon-base"));
    }
}
