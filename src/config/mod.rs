//! Application configuration module
//!
//! This module provides type-safe configuration loading using the `config`
//! and `dotenvy` crates. Values come from an optional `adgenius.{toml,yaml}`
//! file, overridden by environment variables with the `ADGENIUS` prefix;
//! nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use adgenius::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.port);
//! ```

mod error;
mod generation;
mod payment;
mod plans;
mod server;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use generation::GenerationConfig;
pub use payment::PaymentConfig;
pub use plans::PlansConfig;
pub use server::{Environment, ServerConfig};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Name of the optional configuration file, without extension.
const CONFIG_FILE: &str = "adgenius";

/// Root application configuration
///
/// Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, frontend URL)
    #[serde(default)]
    pub server: ServerConfig,

    /// Payment configuration (Stripe)
    pub payment: PaymentConfig,

    /// Image generation configuration (Gemini)
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Usage ledger storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Plan entitlements and trial length
    #[serde(default)]
    pub plans: PlansConfig,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads `adgenius.toml` / `adgenius.yaml` if present
    /// 3. Reads environment variables with `ADGENIUS` prefix
    /// 4. Uses `__` (double underscore) to separate nested values
    /// 5. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ADGENIUS__SERVER__PORT=3001` -> `server.port = 3001`
    /// - `ADGENIUS__PAYMENT__STRIPE_API_KEY=...` -> `payment.stripe_api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required values are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::default()
                    .prefix("ADGENIUS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.payment.validate()?;
        self.generation.validate()?;
        self.storage.validate()?;
        self.plans.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set environment variables for testing
    fn set_minimal_env() {
        env::set_var("ADGENIUS__PAYMENT__STRIPE_API_KEY", "sk_test_xxx");
        env::set_var("ADGENIUS__PAYMENT__STRIPE_WEBHOOK_SECRET", "whsec_xxx");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for key in [
            "ADGENIUS__PAYMENT__STRIPE_API_KEY",
            "ADGENIUS__PAYMENT__STRIPE_WEBHOOK_SECRET",
            "ADGENIUS__PAYMENT__PRO_MONTHLY_PRICE_ID",
            "ADGENIUS__SERVER__PORT",
            "ADGENIUS__SERVER__ENVIRONMENT",
            "ADGENIUS__SERVER__FRONTEND_URL",
            "ADGENIUS__PLANS__TRIAL_DAYS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.payment.stripe_api_key, "sk_test_xxx");
        assert_eq!(config.payment.stripe_webhook_secret, "whsec_xxx");
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_payment_section_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.payment.checkout_trial_days, 7);
        assert_eq!(config.plans.trial_days, 7);
        assert!(!config.generation.is_configured());
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("ADGENIUS__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_environment_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("ADGENIUS__SERVER__PORT", "3000");
        env::set_var("ADGENIUS__SERVER__FRONTEND_URL", "https://adgenius.app");
        env::set_var("ADGENIUS__PAYMENT__PRO_MONTHLY_PRICE_ID", "price_pro_m");
        env::set_var("ADGENIUS__PLANS__TRIAL_DAYS", "14");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.frontend_url, "https://adgenius.app");
        assert_eq!(
            config.payment.pro_monthly_price_id.as_deref(),
            Some("price_pro_m")
        );
        assert_eq!(config.plans.trial_days, 14);
    }
}
