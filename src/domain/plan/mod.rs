//! Plan module - Tiers and what they entitle a user to.

mod billing_period;
mod entitlements;
mod export_quality;
mod tier;

pub use billing_period::BillingPeriod;
pub use entitlements::{DailyQuota, EntitlementTable, Entitlements};
pub use export_quality::ExportQuality;
pub use tier::PlanTier;
