//! Request and response DTOs for the billing endpoints.
//!
//! Field names are camelCase on the wire to match the web frontend.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::plan::{BillingPeriod, PlanTier};
use crate::ports::{CheckoutSession, Coupon, Subscription, SubscriptionStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a hosted checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    pub tier: PlanTier,
    #[serde(default)]
    pub billing_period: BillingPeriod,
    #[serde(default)]
    pub customer_email: Option<String>,
    /// Overrides the configured default trial length. 0 disables the trial.
    #[serde(default)]
    pub trial_days: Option<u32>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortalSessionRequest {
    pub customer_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelSubscriptionRequest {
    pub subscription_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
}

/// Analytics event forwarded by the frontend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEventRequest {
    pub event: String,
    #[serde(default)]
    pub properties: serde_json::Value,
    #[serde(default)]
    pub user_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutSessionResponse {
    pub id: String,
    pub url: String,
}

impl From<CheckoutSession> for CheckoutSessionResponse {
    fn from(session: CheckoutSession) -> Self {
        Self {
            id: session.id,
            url: session.url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortalSessionResponse {
    pub url: String,
}

/// Subscription summary for the account page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusResponse {
    pub active: bool,
    pub plan: Option<String>,
    pub trial_end: Option<DateTime<Utc>>,
    pub cancel_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
}

impl SubscriptionStatusResponse {
    /// Response for a customer with no subscription on record.
    pub fn inactive() -> Self {
        Self {
            active: false,
            plan: None,
            trial_end: None,
            cancel_at: None,
            status: None,
        }
    }
}

impl From<Subscription> for SubscriptionStatusResponse {
    fn from(subscription: Subscription) -> Self {
        let active = matches!(
            subscription.status,
            SubscriptionStatus::Active | SubscriptionStatus::Trialing
        );
        let plan = subscription
            .plan
            .map(|tier| tier.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            active,
            plan: Some(plan),
            trial_end: subscription.trial_end.and_then(unix_to_datetime),
            cancel_at: subscription.cancel_at.and_then(unix_to_datetime),
            status: Some(subscription.status),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CancelSubscriptionResponse {
    pub success: bool,
    pub cancel_at: Option<DateTime<Utc>>,
}

/// Coupon check result. Lookup failures are reported here, not as HTTP errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplyCouponResponse {
    pub valid: bool,
    /// Percent off, or whole currency units off for fixed-amount coupons.
    pub discount: f64,
    pub message: String,
}

impl ApplyCouponResponse {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            discount: 0.0,
            message: message.into(),
        }
    }
}

impl From<Coupon> for ApplyCouponResponse {
    fn from(coupon: Coupon) -> Self {
        if !coupon.valid {
            return Self::invalid("This coupon has expired");
        }

        let discount = coupon
            .percent_off
            .or_else(|| coupon.amount_off.map(|cents| cents as f64 / 100.0))
            .unwrap_or(0.0);
        let message = coupon
            .discount_label()
            .map(|label| format!("{}!", label))
            .unwrap_or_else(|| "Coupon applied".to_string());

        Self {
            valid: true,
            discount,
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookAckResponse {
    pub received: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

fn unix_to_datetime(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}
