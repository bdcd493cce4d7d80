//! Stripe wire types.
//!
//! These types represent Stripe API objects as they arrive in API responses
//! and webhook payloads. Only the fields the billing backend reads are kept.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// Signature Parsing
// ════════════════════════════════════════════════════════════════════════════════

/// Error parsing the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureParseError {
    #[error("Missing Stripe-Signature header")]
    MissingHeader,
    #[error("Missing timestamp (t=) in signature")]
    MissingTimestamp,
    #[error("Missing v1 signature in header")]
    MissingV1Signature,
    #[error("Invalid timestamp format")]
    InvalidTimestamp,
    #[error("Invalid signature format (not valid hex)")]
    InvalidSignatureFormat,
}

/// Parsed Stripe-Signature header.
///
/// Format: `t=<timestamp>,v1=<signature>[,v1=<signature>...]`. Stripe sends
/// one `v1` entry per active signing secret, so all of them are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when Stripe signed the payload.
    pub timestamp: i64,

    /// HMAC-SHA256 signatures, hex-decoded.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        let header = header.trim();
        if header.is_empty() {
            return Err(SignatureParseError::MissingHeader);
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| SignatureParseError::InvalidTimestamp)?,
                    );
                }
                "v1" => {
                    let bytes = hex_decode(value.trim())
                        .ok_or(SignatureParseError::InvalidSignatureFormat)?;
                    v1_signatures.push(bytes);
                }
                // v0 and unknown schemes are ignored.
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureParseError::MissingTimestamp)?;
        if v1_signatures.is_empty() {
            return Err(SignatureParseError::MissingV1Signature);
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Event Envelope
// ════════════════════════════════════════════════════════════════════════════════

/// Raw Stripe webhook event as received from the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeWebhookEvent {
    /// Unique event identifier (evt_...).
    pub id: String,

    /// Event type (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp when the event was created.
    pub created: i64,

    pub data: StripeEventData,

    /// Whether this is a live or test event.
    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object affected by this event.
    pub object: serde_json::Value,
}

// ════════════════════════════════════════════════════════════════════════════════
// API Objects
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe Checkout Session object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Hosted checkout page. Absent on completed-session webhooks.
    pub url: Option<String>,

    pub customer: Option<String>,

    pub customer_email: Option<String>,

    pub subscription: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Stripe billing portal session object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePortalSession {
    pub id: String,
    pub url: String,
}

/// Stripe Subscription object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscription {
    /// Unique subscription identifier (sub_...).
    pub id: String,

    pub customer: String,

    pub status: String,

    #[serde(default)]
    pub current_period_end: i64,

    pub trial_end: Option<i64>,

    pub cancel_at: Option<i64>,

    #[serde(default)]
    pub cancel_at_period_end: bool,

    #[serde(default)]
    pub items: StripeList<StripeSubscriptionItem>,
}

impl StripeSubscription {
    /// Price of the first subscription item.
    pub fn price_id(&self) -> Option<&str> {
        self.items.data.first().map(|item| item.price.id.as_str())
    }
}

/// Paginated list wrapper.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,

    #[serde(default)]
    pub has_more: bool,
}

impl<T> Default for StripeList<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            has_more: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscriptionItem {
    pub id: String,
    pub price: StripePrice,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePrice {
    /// Price ID (price_...).
    pub id: String,
}

/// Stripe Coupon object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCoupon {
    pub id: String,

    #[serde(default)]
    pub valid: bool,

    pub percent_off: Option<f64>,

    pub amount_off: Option<i64>,
}

/// Error envelope returned by the Stripe API.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ════════════════════════════════════════════════════════════════════════════
    // Signature Header
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_signature_header_valid() {
        let header = SignatureHeader::parse("t=1704067200,v1=abcdef0123").unwrap();
        assert_eq!(header.timestamp, 1704067200);
        assert_eq!(header.v1_signatures, vec![vec![0xab, 0xcd, 0xef, 0x01, 0x23]]);
    }

    #[test]
    fn parse_signature_header_keeps_every_v1() {
        let header = SignatureHeader::parse("t=1,v1=aa,v0=bb,v1=cc").unwrap();
        assert_eq!(header.v1_signatures.len(), 2);
    }

    #[test]
    fn parse_signature_header_errors() {
        assert_eq!(
            SignatureHeader::parse(""),
            Err(SignatureParseError::MissingHeader)
        );
        assert_eq!(
            SignatureHeader::parse("v1=abcd"),
            Err(SignatureParseError::MissingTimestamp)
        );
        assert_eq!(
            SignatureHeader::parse("t=1704067200"),
            Err(SignatureParseError::MissingV1Signature)
        );
        assert_eq!(
            SignatureHeader::parse("t=yesterday,v1=abcd"),
            Err(SignatureParseError::InvalidTimestamp)
        );
        assert_eq!(
            SignatureHeader::parse("t=1,v1=abc"),
            Err(SignatureParseError::InvalidSignatureFormat)
        );
        assert_eq!(
            SignatureHeader::parse("t=1,v1=zz"),
            Err(SignatureParseError::InvalidSignatureFormat)
        );
    }

    #[test]
    fn hex_roundtrip() {
        let bytes = vec![0u8, 1, 127, 128, 255];
        assert_eq!(hex_decode(&hex_encode(&bytes)), Some(bytes));
        assert_eq!(hex_encode(&[]), "");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Objects
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_subscription_with_price() {
        let json = r#"{
            "id": "sub_1",
            "object": "subscription",
            "customer": "cus_1",
            "status": "trialing",
            "current_period_end": 1706745600,
            "trial_end": 1704672000,
            "cancel_at": null,
            "items": {"object": "list", "data": [{"id": "si_1", "price": {"id": "price_pro_monthly"}}]}
        }"#;
        let sub: StripeSubscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.price_id(), Some("price_pro_monthly"));
        assert_eq!(sub.trial_end, Some(1704672000));
        assert!(!sub.cancel_at_period_end);
    }

    #[test]
    fn subscription_items_default_to_empty() {
        let json = r#"{"id": "sub_1", "customer": "cus_1", "status": "active"}"#;
        let sub: StripeSubscription = serde_json::from_str(json).unwrap();
        assert!(sub.price_id().is_none());
    }

    #[test]
    fn parse_coupon() {
        let json = r#"{"id": "LAUNCH50", "valid": true, "percent_off": 50.0, "amount_off": null}"#;
        let coupon: StripeCoupon = serde_json::from_str(json).unwrap();
        assert!(coupon.valid);
        assert_eq!(coupon.percent_off, Some(50.0));
    }

    #[test]
    fn parse_error_envelope() {
        let json = r#"{"error": {"type": "invalid_request_error", "code": "resource_missing", "message": "No such coupon: 'NOPE'"}}"#;
        let err: StripeErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(err.error.code.as_deref(), Some("resource_missing"));
    }
}
