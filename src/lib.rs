//! AdGenius - Ad mockup generation with a usage-aware paywall.
//!
//! This crate decides when a user may generate or export a mockup, when to
//! show the upgrade paywall, and hands paid plan selections to Stripe. It
//! also ships the billing backend the web frontend talks to.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
