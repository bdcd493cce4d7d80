//! AdGenius billing backend.
//!
//! Serves checkout, portal, subscription and coupon endpoints for the web
//! frontend and receives Stripe webhooks.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use adgenius::adapters::http::{build_app, BillingAppState};
use adgenius::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use adgenius::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let stripe = StripeConfig::new(
        config.payment.stripe_api_key.clone(),
        config.payment.stripe_webhook_secret.clone(),
        config.payment.price_table(),
    )
    .with_require_livemode(config.is_production());

    if config.is_production() && config.payment.is_test_mode() {
        tracing::warn!("Stripe test key configured in production");
    }

    let state = BillingAppState::new(
        Arc::new(StripePaymentAdapter::new(stripe)),
        config.server.frontend_base_url(),
    )
    .with_environment(config.server.environment.as_str())
    .with_launch_coupon(config.payment.launch_coupon())
    .with_default_trial_days(config.payment.checkout_trial_days);

    let app = build_app(
        state,
        &config.server.cors_origins_list(),
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        environment = config.server.environment.as_str(),
        frontend_url = %config.server.frontend_url,
        stripe_mode = if config.payment.is_live_mode() { "live" } else { "test" },
        "AdGenius billing backend listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
