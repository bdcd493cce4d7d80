//! Ports - Interfaces to external collaborators.
//!
//! - `PaymentProvider` - Subscription billing (Stripe)
//! - `UsageLedgerStore` - Ledger persistence
//! - `ImageGenerator` - Generative image API (Gemini)
//! - `NotificationSink` - Advisory signal delivery

mod image_generator;
mod notification_sink;
mod payment_provider;
mod usage_ledger_store;

pub use image_generator::{GeneratedImage, GenerationError, GenerationRequest, ImageGenerator};
pub use notification_sink::NotificationSink;
pub use payment_provider::{
    CheckoutSession, Coupon, CreateCheckoutRequest, PaymentError, PaymentErrorCode,
    PaymentProvider, PortalSession, Subscription, SubscriptionStatus, WebhookEvent,
    WebhookEventData, WebhookEventType,
};
pub use usage_ledger_store::{LedgerStoreError, UsageLedgerStore};
