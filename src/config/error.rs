//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Frontend URL must be an absolute http(s) URL")]
    InvalidFrontendUrl,

    #[error("Invalid Stripe API key format")]
    InvalidStripeKey,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("Price id for {0} must start with 'price_'")]
    InvalidPriceId(&'static str),

    #[error("Invalid generation timeout")]
    InvalidGenerationTimeout,

    #[error("Trial length must be between 1 and 90 days")]
    InvalidTrialLength,

    #[error("Invalid plan entitlements: {0}")]
    InvalidEntitlements(#[from] crate::domain::foundation::ValidationError),
}
