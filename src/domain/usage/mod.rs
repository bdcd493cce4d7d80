//! Usage module - Per-device usage counters and plan state.

mod ledger;

pub use ledger::{UsageLedger, MAX_TRIAL_DAYS};
