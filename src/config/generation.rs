//! Image generation configuration

use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::gemini::GeminiConfig;

/// Gemini image generation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Gemini API key. Generation is disabled when unset.
    pub gemini_api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Override for the API base URL
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl GenerationConfig {
    /// Check if an API key is configured
    pub fn is_configured(&self) -> bool {
        self.gemini_api_key
            .as_ref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// Build the Gemini adapter config, if generation is configured
    pub fn gemini(&self) -> Option<GeminiConfig> {
        let key = self.gemini_api_key.as_ref().filter(|k| !k.trim().is_empty())?;

        let mut config = GeminiConfig::new(key.trim())
            .with_model(self.model.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_retries(self.max_retries);
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url.clone());
        }
        Some(config)
    }

    /// Validate generation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidGenerationTimeout);
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("GENERATION_MODEL"));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: default_model(),
            base_url: None,
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    2
}
