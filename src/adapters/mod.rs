//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `gemini` - Image generation (Gemini REST, mock)
//! - `http` - Axum billing backend
//! - `notification` - Signal sinks (tracing, collecting)
//! - `storage` - Usage ledger persistence (YAML files, in-memory)
//! - `stripe` - Payment provider (Stripe REST, mock)

pub mod gemini;
pub mod http;
pub mod notification;
pub mod storage;
pub mod stripe;

pub use gemini::{GeminiConfig, GeminiImageGenerator, MockImageGenerator};
pub use notification::{CollectingNotificationSink, TracingNotificationSink};
pub use storage::{FileLedgerStore, InMemoryLedgerStore};
pub use stripe::{MockPaymentProvider, PriceTable, StripeConfig, StripePaymentAdapter};
