//! Image generator port - compositing a product image into a placement.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Input for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Raw bytes of the uploaded product image.
    pub image_bytes: Vec<u8>,
    /// MIME type of the upload, e.g. `image/png`.
    pub mime_type: String,
    /// Placement instruction from the chosen template.
    pub prompt: String,
}

/// A generated mockup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// `data:<mime>;base64,<payload>` URI ready for display.
    pub data_uri: String,
}

impl GeneratedImage {
    pub fn from_base64(mime_type: &str, base64_payload: &str) -> Self {
        Self {
            data_uri: format!("data:{};base64,{}", mime_type, base64_payload),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("No image was generated")]
    NoImageProduced,

    #[error("Generation service unreachable: {0}")]
    Network(String),

    #[error("Generation service error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected generation response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Network(_) => true,
            GenerationError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<GenerationError> for DomainError {
    fn from(err: GenerationError) -> Self {
        DomainError::new(ErrorCode::GenerationFailed, err.to_string())
    }
}

/// Port for the external generative image service.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedImage, GenerationError>;
}
