//! Mock image generator for testing.
//!
//! Returns queued results in order, falling back to a tiny placeholder image
//! once the queue is empty. Supports simulated latency so tests can cancel an
//! in-flight generation.
//!
//! ```ignore
//! let generator = MockImageGenerator::new()
//!     .with_failure(GenerationError::NoImageProduced)
//!     .with_delay(Duration::from_millis(50));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{GeneratedImage, GenerationError, GenerationRequest, ImageGenerator};

/// Base64 of a 1x1 transparent PNG.
const PLACEHOLDER_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

#[derive(Debug, Clone, Default)]
pub struct MockImageGenerator {
    results: Arc<Mutex<VecDeque<Result<GeneratedImage, GenerationError>>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockImageGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful image.
    pub fn with_image(self, data_uri: impl Into<String>) -> Self {
        self.results.lock().unwrap().push_back(Ok(GeneratedImage {
            data_uri: data_uri.into(),
        }));
        self
    }

    /// Queue a failure.
    pub fn with_failure(self, error: GenerationError) -> Self {
        self.results.lock().unwrap().push_back(Err(error));
        self
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedImage, GenerationError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let next = self.results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(GeneratedImage::from_base64("image/png", PLACEHOLDER_PNG)))
    }
}
