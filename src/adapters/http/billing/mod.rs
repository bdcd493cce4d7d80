//! Billing HTTP adapter.
//!
//! Thin REST layer in front of the `PaymentProvider` port, serving the web
//! frontend's checkout, portal, subscription and coupon calls plus Stripe
//! webhooks.

mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use handlers::{BillingApiError, BillingAppState};
pub use routes::{billing_router, billing_routes};
