//! Axum router configuration for billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    apply_coupon, cancel_subscription, create_checkout_session, create_portal_session, health,
    handle_stripe_webhook, subscription_status, track_event, BillingAppState,
};

/// Create the billing API router.
///
/// # Routes
///
/// ## Frontend Endpoints
/// - `POST /api/create-checkout-session` - Start a hosted checkout
/// - `POST /api/create-portal-session` - Open the customer portal
/// - `POST /api/subscription-status` - Latest subscription for a customer
/// - `POST /api/cancel-subscription` - Cancel at period end
/// - `POST /api/apply-coupon` - Check a coupon code
/// - `POST /api/track` - Analytics events
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/create-portal-session", post(create_portal_session))
        .route("/subscription-status", post(subscription_status))
        .route("/cancel-subscription", post(cancel_subscription))
        .route("/apply-coupon", post(apply_coupon))
        .route("/track", post(track_event))
}

/// Create the complete billing router.
///
/// Webhooks sit outside `/api` because Stripe calls them directly and they
/// are authenticated by signature.
///
/// - `POST /webhook` - Stripe webhooks
/// - `GET /health` - Liveness check
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .nest("/api", billing_routes())
        .route("/webhook", post(handle_stripe_webhook))
        .route("/health", get(health))
}
