//! Mock payment provider for testing.
//!
//! Provides a configurable mock implementation of `PaymentProvider` for unit
//! and integration tests. Supports:
//! - Pre-configured responses
//! - Error injection
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::plan::PlanTier;
use crate::ports::{
    CheckoutSession, Coupon, CreateCheckoutRequest, PaymentError, PaymentProvider, PortalSession,
    Subscription, SubscriptionStatus, WebhookEvent, WebhookEventData, WebhookEventType,
};

/// Mock payment provider for testing.
///
/// Clones share state, so a test can keep a handle for assertions after
/// handing the provider to a handler.
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.set_method_error("create_checkout_session", PaymentError::network("down"));
/// let handler = SelectPlanHandler::new(Arc::new(mock.clone()), ...);
/// ```
#[derive(Default)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Subscriptions by customer id.
    subscriptions: HashMap<String, Subscription>,

    /// Coupons by code.
    coupons: HashMap<String, Coupon>,

    next_checkout: Option<CheckoutSession>,

    next_portal: Option<PortalSession>,

    next_webhook_event: Option<WebhookEvent>,

    /// Error to return on next call (consumed).
    next_error: Option<PaymentError>,

    /// Sticky errors by method name.
    method_errors: HashMap<String, PaymentError>,

    call_log: Vec<MethodCall>,

    reject_webhooks: bool,

    /// Latency applied to checkout creation.
    checkout_delay: Duration,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().reject_webhooks = true;
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Register the subscription returned for its customer.
    pub fn add_subscription(&self, subscription: Subscription) {
        let customer = subscription.customer_id.clone();
        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .insert(customer, subscription);
    }

    pub fn add_coupon(&self, coupon: Coupon) {
        let code = coupon.id.clone();
        self.inner.lock().unwrap().coupons.insert(code, coupon);
    }

    pub fn set_checkout_session(&self, session: CheckoutSession) {
        self.inner.lock().unwrap().next_checkout = Some(session);
    }

    pub fn set_portal_session(&self, session: PortalSession) {
        self.inner.lock().unwrap().next_portal = Some(session);
    }

    pub fn set_webhook_event(&self, event: WebhookEvent) {
        self.inner.lock().unwrap().next_webhook_event = Some(event);
    }

    /// Delay checkout creation, e.g. to test dropping an in-flight handoff.
    pub fn set_checkout_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().checkout_delay = delay;
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    pub fn clear_errors(&self) {
        let mut state = self.inner.lock().unwrap();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.call_count(method) > 0
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.inner.lock().unwrap();

        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }
}

impl Clone for MockPaymentProvider {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record_call(
            "create_checkout_session",
            vec![
                request.tier.as_str().to_string(),
                request.billing_period.as_str().to_string(),
                request.trial_days.unwrap_or(0).to_string(),
                request.coupon.clone().unwrap_or_default(),
            ],
        );
        self.check_error("create_checkout_session")?;

        let delay = self.inner.lock().unwrap().checkout_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if request.tier.requires_sales_contact() || !request.tier.is_paid() {
            return Err(PaymentError::invalid_request(format!(
                "No price configured for {}",
                request.tier.as_str()
            )));
        }

        let mut state = self.inner.lock().unwrap();
        Ok(state.next_checkout.take().unwrap_or_else(|| {
            let id = format!("cs_mock_{}", short_id());
            CheckoutSession {
                url: format!("https://checkout.stripe.com/c/pay/{}", id),
                id,
            }
        }))
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentError> {
        self.record_call(
            "create_portal_session",
            vec![customer_id.to_string(), return_url.to_string()],
        );
        self.check_error("create_portal_session")?;

        let mut state = self.inner.lock().unwrap();
        Ok(state.next_portal.take().unwrap_or_else(|| {
            let id = format!("bps_mock_{}", short_id());
            PortalSession {
                url: format!("https://billing.stripe.com/p/session/{}", id),
                id,
            }
        }))
    }

    async fn latest_subscription(
        &self,
        customer_id: &str,
    ) -> Result<Option<Subscription>, PaymentError> {
        self.record_call("latest_subscription", vec![customer_id.to_string()]);
        self.check_error("latest_subscription")?;

        Ok(self
            .inner
            .lock()
            .unwrap()
            .subscriptions
            .get(customer_id)
            .cloned())
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Subscription, PaymentError> {
        self.record_call("cancel_subscription", vec![subscription_id.to_string()]);
        self.check_error("cancel_subscription")?;

        let mut state = self.inner.lock().unwrap();
        let subscription = state
            .subscriptions
            .values_mut()
            .find(|s| s.id == subscription_id)
            .ok_or_else(|| PaymentError::not_found("subscription"))?;

        subscription.cancel_at_period_end = true;
        subscription.cancel_at = Some(subscription.current_period_end);
        Ok(subscription.clone())
    }

    async fn retrieve_coupon(&self, code: &str) -> Result<Coupon, PaymentError> {
        self.record_call("retrieve_coupon", vec![code.to_string()]);
        self.check_error("retrieve_coupon")?;

        self.inner
            .lock()
            .unwrap()
            .coupons
            .get(code)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("coupon"))
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        self.record_call(
            "verify_webhook",
            vec![
                String::from_utf8_lossy(payload).chars().take(50).collect(),
                signature.chars().take(20).collect(),
            ],
        );
        self.check_error("verify_webhook")?;

        let state = self.inner.lock().unwrap();
        if state.reject_webhooks {
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }

        if let Some(event) = &state.next_webhook_event {
            return Ok(event.clone());
        }

        let parsed: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| PaymentError::invalid_webhook(e.to_string()))?;

        let event_type = match parsed["type"].as_str().unwrap_or("unknown") {
            "checkout.session.completed" => WebhookEventType::CheckoutSessionCompleted,
            "customer.subscription.updated" => WebhookEventType::SubscriptionUpdated,
            "customer.subscription.deleted" => WebhookEventType::SubscriptionDeleted,
            other => WebhookEventType::Unknown(other.to_string()),
        };

        Ok(WebhookEvent {
            id: parsed["id"].as_str().unwrap_or("evt_mock").to_string(),
            event_type,
            data: WebhookEventData::Raw {
                json: parsed["data"]["object"].to_string(),
            },
            created_at: parsed["created"]
                .as_i64()
                .unwrap_or_else(|| chrono::Utc::now().timestamp()),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Test Helpers
// ════════════════════════════════════════════════════════════════════════════════

impl MockPaymentProvider {
    /// Create a mock with one subscription for the customer.
    pub fn with_subscription(
        customer_id: &str,
        subscription_id: &str,
        plan: PlanTier,
        status: SubscriptionStatus,
    ) -> Self {
        let mock = Self::new();
        let now = chrono::Utc::now().timestamp();
        mock.add_subscription(Subscription {
            id: subscription_id.to_string(),
            customer_id: customer_id.to_string(),
            status,
            plan: Some(plan),
            current_period_end: now + 30 * 24 * 60 * 60,
            trial_end: (status == SubscriptionStatus::Trialing).then_some(now + 7 * 24 * 60 * 60),
            cancel_at: None,
            cancel_at_period_end: false,
        });
        mock
    }

    /// Create a checkout completed webhook event.
    pub fn checkout_completed_event(customer_id: &str, subscription_id: &str) -> WebhookEvent {
        WebhookEvent {
            id: format!("evt_checkout_{}", short_id()),
            event_type: WebhookEventType::CheckoutSessionCompleted,
            data: WebhookEventData::Checkout {
                session_id: format!("cs_{}", short_id()),
                customer_id: Some(customer_id.to_string()),
                subscription_id: Some(subscription_id.to_string()),
                customer_email: None,
            },
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Create a subscription deleted webhook event.
    pub fn subscription_deleted_event(customer_id: &str, subscription_id: &str) -> WebhookEvent {
        WebhookEvent {
            id: format!("evt_del_{}", short_id()),
            event_type: WebhookEventType::SubscriptionDeleted,
            data: WebhookEventData::Subscription {
                subscription_id: subscription_id.to_string(),
                customer_id: customer_id.to_string(),
                status: SubscriptionStatus::Canceled,
                cancel_at_period_end: false,
            },
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}
