//! Paywall module - Deciding when to interrupt a user with an upgrade prompt.
//!
//! # Module Organization
//!
//! - `action` - Gated user actions and evaluation context
//! - `trigger` - Reasons a paywall is raised
//! - `message` - Display payloads and the static message catalog
//! - `signal` - Non-blocking advisory notices
//! - `evaluator` - The rules engine
//! - `session` - Open/closed prompt state

mod action;
mod errors;
mod evaluator;
mod message;
mod session;
mod signal;
mod trigger;

pub use action::{ActionContext, UserAction};
pub use errors::PaywallError;
pub use evaluator::{
    DeferredPaywall, Evaluation, TriggerEvaluator, TIME_INVESTMENT_MIN_EDITS,
    TIME_INVESTMENT_MIN_SECS,
};
pub use message::{MessageCatalog, PaywallMessage};
pub use session::{ActivePaywall, PaywallPhase, PaywallSession, PaywallSessionView};
pub use signal::{Severity, Signal};
pub use trigger::PaywallTrigger;
