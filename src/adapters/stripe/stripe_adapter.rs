//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let prices = PriceTable::new()
//!     .with_price(PlanTier::Pro, BillingPeriod::Monthly, "price_pro_monthly");
//! let adapter = StripePaymentAdapter::new(StripeConfig::new(api_key, webhook_secret, prices));
//! ```

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::plan::{BillingPeriod, PlanTier};
use crate::ports::{
    CheckoutSession, Coupon, CreateCheckoutRequest, PaymentError, PaymentErrorCode,
    PaymentProvider, PortalSession, Subscription, SubscriptionStatus, WebhookEvent,
    WebhookEventData, WebhookEventType,
};

use super::webhook_types::{
    SignatureHeader, StripeCheckoutSession, StripeCoupon, StripeErrorResponse,
    StripeList, StripePortalSession, StripeSubscription, StripeWebhookEvent,
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe price ids per plan tier and billing period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceTable {
    entries: Vec<(PlanTier, BillingPeriod, String)>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a price. Blank ids are ignored so unset config stays unset.
    pub fn with_price(
        mut self,
        tier: PlanTier,
        period: BillingPeriod,
        price_id: impl Into<String>,
    ) -> Self {
        let price_id = price_id.into();
        if price_id.trim().is_empty() {
            return self;
        }
        self.entries.retain(|(t, p, _)| !(*t == tier && *p == period));
        self.entries.push((tier, period, price_id));
        self
    }

    /// Get the price id for a paid tier and period.
    pub fn price_id(&self, tier: PlanTier, period: BillingPeriod) -> Result<&str, PaymentError> {
        if !tier.is_paid() {
            return Err(PaymentError::invalid_request(
                "Free tier does not have a Stripe price",
            ));
        }
        self.entries
            .iter()
            .find(|(t, p, _)| *t == tier && *p == period)
            .map(|(_, _, id)| id.as_str())
            .ok_or_else(|| {
                PaymentError::invalid_request(format!(
                    "No price configured for {} ({})",
                    tier.as_str(),
                    period
                ))
            })
    }

    /// Map a subscribed price back to its plan.
    pub fn plan_for_price(&self, price_id: &str) -> Option<PlanTier> {
        self.entries
            .iter()
            .find(|(_, _, id)| id == price_id)
            .map(|(tier, _, _)| *tier)
    }
}

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Whether to reject test-mode events.
    require_livemode: bool,

    prices: PriceTable,
}

impl StripeConfig {
    pub fn new(
        api_key: impl Into<String>,
        webhook_secret: impl Into<String>,
        prices: PriceTable,
    ) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            require_livemode: false,
            prices,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Require livemode events in production.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.api_base_url, path)
    }

    /// Send an authenticated request and decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        operation: &'static str,
    ) -> Result<T, PaymentError> {
        let response = request
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = error_from_response(status.as_u16(), &body);
            tracing::error!(
                operation,
                status = status.as_u16(),
                code = %err.code,
                error = %err.message,
                "Stripe request failed"
            );
            return Err(err);
        }

        response.json::<T>().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })
    }

    /// Verify webhook signature using HMAC-SHA256.
    ///
    /// Any `v1` entry matching the expected signature is accepted.
    fn verify_signature(&self, payload: &[u8], header: &SignatureHeader) -> Result<(), PaymentError> {
        let now = chrono::Utc::now().timestamp();
        let Some(age) = now.checked_sub(header.timestamp) else {
            tracing::warn!(
                event_timestamp = header.timestamp,
                "Webhook timestamp out of range"
            );
            return Err(PaymentError::invalid_webhook("Invalid timestamp"));
        };

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(PaymentError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(PaymentError::invalid_webhook("Event timestamp in future"));
        }

        let mut mac = HmacSha256::new_from_slice(self.config.webhook_secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(header.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = mac.finalize().into_bytes();
        let expected_bytes: &[u8] = expected.as_slice();

        let matched = header
            .v1_signatures
            .iter()
            .any(|provided| expected_bytes.ct_eq(provided.as_slice()).unwrap_u8() == 1);

        if !matched {
            tracing::warn!(
                event_timestamp = header.timestamp,
                signatures = header.v1_signatures.len(),
                "Invalid webhook signature"
            );
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }

    /// Parse a Stripe event and convert to port types.
    fn parse_event(&self, payload: &[u8]) -> Result<WebhookEvent, PaymentError> {
        let stripe_event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            PaymentError::invalid_webhook(format!("Invalid JSON: {}", e))
        })?;

        if self.config.require_livemode && !stripe_event.livemode {
            tracing::warn!(
                event_id = %stripe_event.id,
                "Rejected test mode event in production"
            );
            return Err(PaymentError::invalid_webhook(
                "Test mode events not allowed in production",
            ));
        }

        let event_type = match stripe_event.event_type.as_str() {
            "checkout.session.completed" => WebhookEventType::CheckoutSessionCompleted,
            "customer.subscription.updated" => WebhookEventType::SubscriptionUpdated,
            "customer.subscription.deleted" => WebhookEventType::SubscriptionDeleted,
            other => WebhookEventType::Unknown(other.to_string()),
        };

        let data = Self::extract_event_data(&event_type, &stripe_event)?;

        Ok(WebhookEvent {
            id: stripe_event.id,
            event_type,
            data,
            created_at: stripe_event.created,
        })
    }

    fn extract_event_data(
        event_type: &WebhookEventType,
        event: &StripeWebhookEvent,
    ) -> Result<WebhookEventData, PaymentError> {
        match event_type {
            WebhookEventType::CheckoutSessionCompleted => {
                let session: StripeCheckoutSession =
                    serde_json::from_value(event.data.object.clone()).map_err(|e| {
                        PaymentError::invalid_webhook(format!("Invalid checkout session: {}", e))
                    })?;

                Ok(WebhookEventData::Checkout {
                    session_id: session.id,
                    customer_id: session.customer,
                    subscription_id: session.subscription,
                    customer_email: session.customer_email,
                })
            }

            WebhookEventType::SubscriptionUpdated | WebhookEventType::SubscriptionDeleted => {
                let sub: StripeSubscription = serde_json::from_value(event.data.object.clone())
                    .map_err(|e| {
                        PaymentError::invalid_webhook(format!("Invalid subscription: {}", e))
                    })?;

                Ok(WebhookEventData::Subscription {
                    status: parse_status(&sub.status),
                    subscription_id: sub.id,
                    customer_id: sub.customer,
                    cancel_at_period_end: sub.cancel_at_period_end,
                })
            }

            WebhookEventType::Unknown(_) => Ok(WebhookEventData::Raw {
                json: event.data.object.to_string(),
            }),
        }
    }

    fn to_subscription(&self, sub: StripeSubscription) -> Subscription {
        let plan = sub
            .price_id()
            .and_then(|price| self.config.prices.plan_for_price(price));
        Subscription {
            status: parse_status(&sub.status),
            plan,
            id: sub.id,
            customer_id: sub.customer,
            current_period_end: sub.current_period_end,
            trial_end: sub.trial_end,
            cancel_at: sub.cancel_at,
            cancel_at_period_end: sub.cancel_at_period_end,
        }
    }

    fn checkout_params(&self, request: &CreateCheckoutRequest) -> Result<Vec<(String, String)>, PaymentError> {
        if request.tier.requires_sales_contact() {
            return Err(PaymentError::invalid_request(format!(
                "{} plans are sold through sales",
                request.tier
            )));
        }
        let price_id = self.config.prices.price_id(request.tier, request.billing_period)?;

        let mut params: Vec<(String, String)> = vec![
            ("mode".into(), "subscription".into()),
            ("payment_method_types[0]".into(), "card".into()),
            ("line_items[0][price]".into(), price_id.to_string()),
            ("line_items[0][quantity]".into(), "1".into()),
            ("success_url".into(), request.success_url.clone()),
            ("cancel_url".into(), request.cancel_url.clone()),
            ("metadata[tier]".into(), request.tier.as_str().into()),
            (
                "metadata[billing_period]".into(),
                request.billing_period.as_str().into(),
            ),
        ];

        for (key, value) in &request.metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }

        if let Some(email) = &request.customer_email {
            params.push(("customer_email".into(), email.clone()));
        }

        if let Some(days) = request.trial_days.filter(|d| *d > 0) {
            params.push((
                "subscription_data[trial_period_days]".into(),
                days.to_string(),
            ));
        }

        if let Some(coupon) = &request.coupon {
            params.push(("discounts[0][coupon]".into(), coupon.clone()));
        }

        Ok(params)
    }
}

fn parse_status(status: &str) -> SubscriptionStatus {
    match status {
        "active" => SubscriptionStatus::Active,
        "trialing" => SubscriptionStatus::Trialing,
        "past_due" => SubscriptionStatus::PastDue,
        "canceled" => SubscriptionStatus::Canceled,
        "incomplete" => SubscriptionStatus::Incomplete,
        "incomplete_expired" => SubscriptionStatus::IncompleteExpired,
        "unpaid" => SubscriptionStatus::Unpaid,
        "paused" => SubscriptionStatus::Paused,
        _ => SubscriptionStatus::Unknown,
    }
}

/// Translate a non-2xx Stripe response into a `PaymentError`.
fn error_from_response(status: u16, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<StripeErrorResponse>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|p| p.error.message.clone())
        .unwrap_or_else(|| format!("Stripe API error (HTTP {})", status));

    let code = match status {
        400 | 402 => PaymentErrorCode::InvalidRequest,
        401 | 403 => PaymentErrorCode::AuthenticationError,
        404 => PaymentErrorCode::NotFound,
        429 => PaymentErrorCode::RateLimitExceeded,
        500..=599 => PaymentErrorCode::ProviderError,
        _ => PaymentErrorCode::Unknown,
    };

    let err = PaymentError::new(code, message);
    match parsed.and_then(|p| p.error.code.or(p.error.error_type)) {
        Some(provider_code) => err.with_provider_code(provider_code),
        None => err,
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let params = self.checkout_params(&request)?;
        let request_builder = self
            .http_client
            .post(self.endpoint("checkout/sessions"))
            .form(&params);

        let session: StripeCheckoutSession =
            self.send(request_builder, "create_checkout_session").await?;

        let url = session
            .url
            .ok_or_else(|| PaymentError::provider("Checkout session has no URL"))?;

        tracing::info!(
            session_id = %session.id,
            tier = request.tier.as_str(),
            billing_period = request.billing_period.as_str(),
            "Stripe checkout session created"
        );

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentError> {
        let request_builder = self
            .http_client
            .post(self.endpoint("billing_portal/sessions"))
            .form(&[("customer", customer_id), ("return_url", return_url)]);

        let portal: StripePortalSession =
            self.send(request_builder, "create_portal_session").await?;

        Ok(PortalSession {
            id: portal.id,
            url: portal.url,
        })
    }

    async fn latest_subscription(
        &self,
        customer_id: &str,
    ) -> Result<Option<Subscription>, PaymentError> {
        let request_builder = self.http_client.get(self.endpoint("subscriptions")).query(&[
            ("customer", customer_id),
            ("status", "all"),
            ("limit", "1"),
        ]);

        let list: StripeList<StripeSubscription> =
            self.send(request_builder, "latest_subscription").await?;

        Ok(list
            .data
            .into_iter()
            .next()
            .map(|sub| self.to_subscription(sub)))
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Subscription, PaymentError> {
        let request_builder = self
            .http_client
            .post(self.endpoint(&format!("subscriptions/{}", subscription_id)))
            .form(&[("cancel_at_period_end", "true")]);

        let sub: StripeSubscription = self.send(request_builder, "cancel_subscription").await?;

        tracing::info!(
            subscription_id = %sub.id,
            cancel_at = ?sub.cancel_at,
            "Stripe subscription set to cancel at period end"
        );

        Ok(self.to_subscription(sub))
    }

    async fn retrieve_coupon(&self, code: &str) -> Result<Coupon, PaymentError> {
        let request_builder = self
            .http_client
            .get(self.endpoint(&format!("coupons/{}", code)));

        let coupon: StripeCoupon = self.send(request_builder, "retrieve_coupon").await?;

        Ok(Coupon {
            id: coupon.id,
            valid: coupon.valid,
            percent_off: coupon.percent_off,
            amount_off: coupon.amount_off,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
            PaymentError::invalid_webhook(e.to_string())
        })?;

        self.verify_signature(payload, &header)?;

        let event = self.parse_event(payload)?;

        tracing::info!(
            event_id = %event.id,
            event_type = ?event.event_type,
            "Webhook signature verified"
        );

        Ok(event)
    }
}
