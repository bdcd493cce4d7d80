//! Generative image adapters.
//!
//! - `GeminiImageGenerator` - Google Gemini `generateContent`
//! - `MockImageGenerator` - Queued results for tests

mod gemini_generator;
mod mock_generator;

pub use gemini_generator::{GeminiConfig, GeminiImageGenerator};
pub use mock_generator::MockImageGenerator;
