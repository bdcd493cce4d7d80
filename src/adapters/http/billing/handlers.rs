//! HTTP handlers for billing endpoints.
//!
//! Each handler forwards to the `PaymentProvider` port; the backend keeps no
//! state of its own beyond configuration.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::Utc;

use crate::domain::usage::MAX_TRIAL_DAYS;
use crate::ports::{
    CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentProvider, WebhookEvent,
    WebhookEventData, WebhookEventType,
};

use super::dto::{
    ApplyCouponRequest, ApplyCouponResponse, CancelSubscriptionRequest,
    CancelSubscriptionResponse, CheckoutSessionResponse, CreateCheckoutSessionRequest,
    CreatePortalSessionRequest, ErrorResponse, HealthResponse, PortalSessionResponse,
    SubscriptionStatusRequest, SubscriptionStatusResponse, SuccessResponse, TrackEventRequest,
    WebhookAckResponse,
};

/// Stripe's `{CHECKOUT_SESSION_ID}` placeholder, substituted by Stripe on redirect.
const CHECKOUT_SESSION_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

const SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the billing routes.
#[derive(Clone)]
pub struct BillingAppState {
    pub payment_provider: Arc<dyn PaymentProvider>,
    /// Base URL of the web frontend, used for redirect and return URLs.
    pub frontend_url: String,
    /// Reported by the health check.
    pub environment: String,
    /// Applied to every checkout when set.
    pub launch_coupon: Option<String>,
    /// Trial length used when the request does not specify one.
    pub default_trial_days: u32,
}

impl BillingAppState {
    pub fn new(payment_provider: Arc<dyn PaymentProvider>, frontend_url: impl Into<String>) -> Self {
        Self {
            payment_provider,
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
            environment: "development".to_string(),
            launch_coupon: None,
            default_trial_days: 7,
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_launch_coupon(mut self, coupon: Option<String>) -> Self {
        self.launch_coupon = coupon.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_default_trial_days(mut self, days: u32) -> Self {
        self.default_trial_days = days;
        self
    }

    fn default_success_url(&self) -> String {
        format!(
            "{}/success?session_id={}",
            self.frontend_url, CHECKOUT_SESSION_PLACEHOLDER
        )
    }

    fn default_cancel_url(&self) -> String {
        format!("{}/pricing", self.frontend_url)
    }

    fn portal_return_url(&self) -> String {
        format!("{}/account", self.frontend_url)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout & Portal
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/create-checkout-session
pub async fn create_checkout_session(
    State(state): State<BillingAppState>,
    Json(request): Json<CreateCheckoutSessionRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    if request.tier.requires_sales_contact() || !request.tier.is_paid() {
        return Err(BillingApiError::validation(
            "tier",
            format!("{} cannot be purchased through checkout", request.tier),
        ));
    }

    let trial_days = request.trial_days.unwrap_or(state.default_trial_days);
    if trial_days > MAX_TRIAL_DAYS {
        return Err(BillingApiError::validation(
            "trialDays",
            format!("Trial length must be between 0 and {} days", MAX_TRIAL_DAYS),
        ));
    }

    let mut metadata = request.metadata;
    metadata.insert("timestamp".to_string(), Utc::now().to_rfc3339());

    let checkout = CreateCheckoutRequest {
        tier: request.tier,
        billing_period: request.billing_period,
        customer_email: request.customer_email.filter(|e| !e.trim().is_empty()),
        trial_days: (trial_days > 0).then_some(trial_days),
        success_url: request
            .success_url
            .unwrap_or_else(|| state.default_success_url()),
        cancel_url: request
            .cancel_url
            .unwrap_or_else(|| state.default_cancel_url()),
        coupon: state.launch_coupon.clone(),
        metadata,
    };

    let session = state
        .payment_provider
        .create_checkout_session(checkout)
        .await
        .map_err(|e| BillingApiError::provider("Failed to create checkout session", e))?;

    tracing::info!(
        session_id = %session.id,
        tier = request.tier.as_str(),
        billing_period = request.billing_period.as_str(),
        trial_days,
        "Checkout session created"
    );

    Ok(Json(CheckoutSessionResponse::from(session)))
}

/// POST /api/create-portal-session
pub async fn create_portal_session(
    State(state): State<BillingAppState>,
    Json(request): Json<CreatePortalSessionRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    if request.customer_id.trim().is_empty() {
        return Err(BillingApiError::validation(
            "customerId",
            "customerId is required",
        ));
    }

    let session = state
        .payment_provider
        .create_portal_session(&request.customer_id, &state.portal_return_url())
        .await
        .map_err(|e| BillingApiError::provider("Failed to create portal session", e))?;

    Ok(Json(PortalSessionResponse { url: session.url }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Subscriptions & Coupons
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/subscription-status
pub async fn subscription_status(
    State(state): State<BillingAppState>,
    Json(request): Json<SubscriptionStatusRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let Some(customer_id) = request.customer_id.filter(|c| !c.trim().is_empty()) else {
        return Ok(Json(SubscriptionStatusResponse::inactive()));
    };

    let subscription = state
        .payment_provider
        .latest_subscription(&customer_id)
        .await
        .map_err(|e| BillingApiError::provider("Failed to check subscription", e))?;

    let response = subscription
        .map(SubscriptionStatusResponse::from)
        .unwrap_or_else(SubscriptionStatusResponse::inactive);

    Ok(Json(response))
}

/// POST /api/cancel-subscription
///
/// Always cancels at the end of the current period.
pub async fn cancel_subscription(
    State(state): State<BillingAppState>,
    Json(request): Json<CancelSubscriptionRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    if request.subscription_id.trim().is_empty() {
        return Err(BillingApiError::validation(
            "subscriptionId",
            "subscriptionId is required",
        ));
    }

    let subscription = state
        .payment_provider
        .cancel_subscription(&request.subscription_id)
        .await
        .map_err(|e| BillingApiError::provider("Failed to cancel subscription", e))?;

    tracing::info!(
        subscription_id = %subscription.id,
        cancel_at = ?subscription.cancel_at,
        "Subscription set to cancel at period end"
    );

    Ok(Json(CancelSubscriptionResponse {
        success: true,
        cancel_at: subscription
            .cancel_at
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0)),
    }))
}

/// POST /api/apply-coupon
pub async fn apply_coupon(
    State(state): State<BillingAppState>,
    Json(request): Json<ApplyCouponRequest>,
) -> impl IntoResponse {
    let code = request.code.trim();
    if code.is_empty() {
        return Json(ApplyCouponResponse::invalid("Invalid coupon code"));
    }

    match state.payment_provider.retrieve_coupon(code).await {
        Ok(coupon) => Json(ApplyCouponResponse::from(coupon)),
        Err(err) => {
            tracing::warn!(code, error = %err, "Coupon lookup failed");
            Json(ApplyCouponResponse::invalid("Invalid coupon code"))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Analytics, Webhooks, Health
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/track
pub async fn track_event(Json(request): Json<TrackEventRequest>) -> impl IntoResponse {
    tracing::info!(
        target: "analytics",
        event = %request.event,
        user_id = request.user_id.as_deref().unwrap_or("anonymous"),
        properties = %request.properties,
        "Analytics event"
    );

    Json(SuccessResponse { success: true })
}

/// POST /webhook
///
/// Verifies the `Stripe-Signature` header over the raw body before relaying
/// the event.
pub async fn handle_stripe_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            BillingApiError::validation(SIGNATURE_HEADER, "Missing Stripe-Signature header")
        })?;

    let event = state
        .payment_provider
        .verify_webhook(&body, signature)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Webhook signature verification failed");
            BillingApiError::InvalidWebhook(e.message)
        })?;

    relay_event(&event);

    Ok(Json(WebhookAckResponse { received: true }))
}

/// Emit a structured log line for a verified webhook event.
fn relay_event(event: &WebhookEvent) {
    match (&event.event_type, &event.data) {
        (
            WebhookEventType::CheckoutSessionCompleted,
            WebhookEventData::Checkout {
                session_id,
                customer_id,
                subscription_id,
                ..
            },
        ) => {
            tracing::info!(
                event_id = %event.id,
                session_id = %session_id,
                customer_id = customer_id.as_deref().unwrap_or(""),
                subscription_id = subscription_id.as_deref().unwrap_or(""),
                "Checkout completed"
            );
        }
        (
            WebhookEventType::SubscriptionUpdated,
            WebhookEventData::Subscription {
                subscription_id,
                customer_id,
                status,
                cancel_at_period_end,
            },
        ) => {
            tracing::info!(
                event_id = %event.id,
                subscription_id = %subscription_id,
                customer_id = %customer_id,
                status = status.as_str(),
                cancel_at_period_end,
                "Subscription updated"
            );
        }
        (
            WebhookEventType::SubscriptionDeleted,
            WebhookEventData::Subscription {
                subscription_id,
                customer_id,
                ..
            },
        ) => {
            tracing::info!(
                event_id = %event.id,
                subscription_id = %subscription_id,
                customer_id = %customer_id,
                "Subscription cancelled"
            );
        }
        (event_type, _) => {
            tracing::debug!(event_id = %event.id, event_type = ?event_type, "Unhandled webhook event");
        }
    }
}

/// GET /health
pub async fn health(State(state): State<BillingAppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        environment: state.environment.clone(),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing failures to HTTP responses.
#[derive(Debug)]
pub enum BillingApiError {
    Validation { field: String, message: String },
    InvalidWebhook(String),
    Provider { context: String, source: PaymentError },
}

impl BillingApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn provider(context: impl Into<String>, source: PaymentError) -> Self {
        tracing::error!(error = %source, "Payment provider call failed");
        Self::Provider {
            context: context.into(),
            source,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            BillingApiError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            BillingApiError::InvalidWebhook(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_WEBHOOK_SIGNATURE")
            }
            BillingApiError::Provider { source, .. } => match source.code {
                PaymentErrorCode::InvalidRequest => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
                PaymentErrorCode::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                PaymentErrorCode::RateLimitExceeded => {
                    (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED")
                }
                PaymentErrorCode::InvalidWebhook => {
                    (StatusCode::BAD_REQUEST, "INVALID_WEBHOOK_SIGNATURE")
                }
                _ => (StatusCode::BAD_GATEWAY, "PAYMENT_PROVIDER_ERROR"),
            },
        }
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = self.status_and_code();

        let body = match self {
            BillingApiError::Validation { field, message } => ErrorResponse::with_details(
                error_code,
                message,
                serde_json::json!({ "field": field }),
            ),
            BillingApiError::InvalidWebhook(message) => ErrorResponse::new(error_code, message),
            BillingApiError::Provider { context, source } => ErrorResponse::with_details(
                error_code,
                context,
                serde_json::json!({ "reason": source.message, "retryable": source.retryable }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
