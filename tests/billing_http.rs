//! HTTP tests for the billing router against the mock payment provider.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use adgenius::adapters::http::{build_app, BillingAppState};
use adgenius::adapters::stripe::MockPaymentProvider;
use adgenius::domain::plan::PlanTier;
use adgenius::ports::{Coupon, PaymentError, SubscriptionStatus};

const FRONTEND: &str = "https://adgenius.app";

fn app(provider: &MockPaymentProvider) -> Router {
    let state = BillingAppState::new(Arc::new(provider.clone()), FRONTEND)
        .with_environment("test")
        .with_launch_coupon(Some("LAUNCH50".to_string()));
    build_app(state, &[FRONTEND.to_string()], Duration::from_secs(5))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout & Portal
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn checkout_applies_defaults() {
    let provider = MockPaymentProvider::new();

    let (status, body) = send(
        app(&provider),
        post_json(
            "/api/create-checkout-session",
            json!({ "tier": "starter", "customerEmail": "owner@shop.example" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["id"].as_str().unwrap().starts_with("cs_mock_"));
    assert!(body["url"].as_str().unwrap().starts_with("https://checkout.stripe.com/"));

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args, vec!["starter", "monthly", "7", "LAUNCH50"]);
}

#[tokio::test]
async fn checkout_with_zero_trial_days_sends_no_trial() {
    let provider = MockPaymentProvider::new();

    let (status, _) = send(
        app(&provider),
        post_json(
            "/api/create-checkout-session",
            json!({ "tier": "pro", "billingPeriod": "yearly", "trialDays": 0 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.calls()[0].args, vec!["pro", "yearly", "0", "LAUNCH50"]);
}

#[tokio::test]
async fn checkout_rejects_contact_sales_tier() {
    let provider = MockPaymentProvider::new();

    let (status, body) = send(
        app(&provider),
        post_json("/api/create-checkout-session", json!({ "tier": "business" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_FAILED");
    assert!(!provider.was_called("create_checkout_session"));
}

#[tokio::test]
async fn checkout_rejects_overlong_trial() {
    let provider = MockPaymentProvider::new();

    let (status, body) = send(
        app(&provider),
        post_json(
            "/api/create-checkout-session",
            json!({ "tier": "pro", "trialDays": 100000 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_FAILED");
    assert!(!provider.was_called("create_checkout_session"));
}

#[tokio::test]
async fn checkout_provider_failure_is_bad_gateway() {
    let provider = MockPaymentProvider::new();
    provider.set_error(PaymentError::network("connection reset"));

    let (status, body) = send(
        app(&provider),
        post_json("/api/create-checkout-session", json!({ "tier": "pro" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error_code"], "PAYMENT_PROVIDER_ERROR");
    assert_eq!(body["message"], "Failed to create checkout session");
    assert_eq!(body["details"]["retryable"], true);
}

#[tokio::test]
async fn portal_returns_to_account_page() {
    let provider = MockPaymentProvider::new();

    let (status, body) = send(
        app(&provider),
        post_json("/api/create-portal-session", json!({ "customerId": "cus_1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["url"].as_str().unwrap().starts_with("https://billing.stripe.com/"));
    assert_eq!(
        provider.calls()[0].args,
        vec!["cus_1", "https://adgenius.app/account"]
    );
}

// ════════════════════════════════════════════════════════════════════════════════
// Subscriptions & Coupons
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn subscription_status_without_customer_is_inactive() {
    let provider = MockPaymentProvider::new();

    let (status, body) = send(app(&provider), post_json("/api/subscription-status", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);
    assert!(body["plan"].is_null());
    assert!(!provider.was_called("latest_subscription"));
}

#[tokio::test]
async fn subscription_status_reports_trial() {
    let provider = MockPaymentProvider::with_subscription(
        "cus_1",
        "sub_1",
        PlanTier::Pro,
        SubscriptionStatus::Trialing,
    );

    let (status, body) = send(
        app(&provider),
        post_json("/api/subscription-status", json!({ "customerId": "cus_1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], true);
    assert_eq!(body["plan"], "pro");
    assert_eq!(body["status"], "trialing");
    assert!(body["trialEnd"].is_string());
}

#[tokio::test]
async fn subscription_status_for_unknown_customer_is_inactive() {
    let provider = MockPaymentProvider::new();

    let (status, body) = send(
        app(&provider),
        post_json("/api/subscription-status", json!({ "customerId": "cus_nobody" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);
}

#[tokio::test]
async fn cancel_schedules_end_of_period() {
    let provider = MockPaymentProvider::with_subscription(
        "cus_1",
        "sub_1",
        PlanTier::Starter,
        SubscriptionStatus::Active,
    );

    let (status, body) = send(
        app(&provider),
        post_json("/api/cancel-subscription", json!({ "subscriptionId": "sub_1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["cancelAt"].is_string());
}

#[tokio::test]
async fn cancel_unknown_subscription_is_not_found() {
    let provider = MockPaymentProvider::new();

    let (status, body) = send(
        app(&provider),
        post_json("/api/cancel-subscription", json!({ "subscriptionId": "sub_missing" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn valid_coupon_reports_discount() {
    let provider = MockPaymentProvider::new();
    provider.add_coupon(Coupon {
        id: "LAUNCH50".to_string(),
        valid: true,
        percent_off: Some(50.0),
        amount_off: None,
    });

    let (status, body) = send(
        app(&provider),
        post_json("/api/apply-coupon", json!({ "code": "LAUNCH50" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["discount"], 50.0);
    assert_eq!(body["message"], "50% off!");
}

#[tokio::test]
async fn unknown_coupon_is_invalid_not_an_error() {
    let provider = MockPaymentProvider::new();

    let (status, body) = send(
        app(&provider),
        post_json("/api/apply-coupon", json!({ "code": "NOPE" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["message"], "Invalid coupon code");
}

// ════════════════════════════════════════════════════════════════════════════════
// Analytics, Webhooks, Health
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn track_acknowledges_event() {
    let provider = MockPaymentProvider::new();

    let (status, body) = send(
        app(&provider),
        post_json(
            "/api/track",
            json!({ "event": "paywall_shown", "properties": { "trigger": "daily_limit_reached" } }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn webhook_with_valid_signature_is_received() {
    let provider = MockPaymentProvider::new();
    provider.set_webhook_event(MockPaymentProvider::checkout_completed_event("cus_1", "sub_1"));

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("Stripe-Signature", "t=1700000000,v1=abc")
        .body(Body::from(r#"{"type":"checkout.session.completed"}"#))
        .unwrap();
    let (status, body) = send(app(&provider), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "received": true }));
    assert!(provider.was_called("verify_webhook"));
}

#[tokio::test]
async fn webhook_with_bad_signature_is_rejected() {
    let provider = MockPaymentProvider::rejecting_webhooks();

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("Stripe-Signature", "t=1700000000,v1=bad")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(app(&provider), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INVALID_WEBHOOK_SIGNATURE");
}

#[tokio::test]
async fn webhook_without_signature_is_rejected() {
    let provider = MockPaymentProvider::new();

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _) = send(app(&provider), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!provider.was_called("verify_webhook"));
}

#[tokio::test]
async fn health_reports_environment() {
    let provider = MockPaymentProvider::new();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&provider), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "test");
    assert!(body["timestamp"].is_string());
}
