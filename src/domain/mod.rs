//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `plan` - Plan tiers and the entitlement table
//! - `usage` - Per-device usage ledger
//! - `paywall` - Trigger evaluation, messages and the paywall session
//! - `mockup` - Placement template catalog

pub mod foundation;
pub mod mockup;
pub mod paywall;
pub mod plan;
pub mod usage;
