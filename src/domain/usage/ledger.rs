//! Usage ledger entity.
//!
//! The ledger is the persisted record of how many mockups a device has
//! generated and which plan it is on. It is created with free-tier defaults
//! on first use and is never deleted, only reset.
//!
//! # Design Decisions
//!
//! - **Owned value**: Callers hold the ledger and mutate through `&mut`,
//!   replacing it only after the new value has been persisted
//! - **Total operations**: Every transition is a pure function of the
//!   previous ledger and its inputs and cannot fail
//! - **Lazy rollover**: The daily window is reconciled when an action reads
//!   it, never on a timer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::plan::PlanTier;

/// Longest trial a device or checkout may be granted.
pub const MAX_TRIAL_DAYS: u32 = 90;

/// Usage ledger - counters and plan state for one device.
///
/// # Invariants
///
/// - `lifetime_count` never decreases
/// - `daily_count` counts generations made on `last_reset_date` only
/// - `trial_ends_at` is `Some` exactly when `is_trialing`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLedger {
    /// Plan tier currently in effect.
    pub plan_tier: PlanTier,

    /// Whether the current tier comes from a trial.
    pub is_trialing: bool,

    /// When the trial ends (if trialing).
    pub trial_ends_at: Option<Timestamp>,

    /// Mockups generated on `last_reset_date`.
    pub daily_count: u32,

    /// Mockups generated since the ledger was created.
    pub lifetime_count: u64,

    /// Calendar date (UTC) the daily counter belongs to.
    pub last_reset_date: NaiveDate,
}

impl UsageLedger {
    /// Create a fresh free-tier ledger.
    pub fn new_free(today: NaiveDate) -> Self {
        Self {
            plan_tier: PlanTier::Free,
            is_trialing: false,
            trial_ends_at: None,
            daily_count: 0,
            lifetime_count: 0,
            last_reset_date: today,
        }
    }

    /// Zero the daily counter if `today` is a different date.
    ///
    /// Idempotent for a given `today`.
    pub fn reconcile_daily_window(self, today: NaiveDate) -> Self {
        if self.last_reset_date == today {
            return self;
        }
        Self {
            daily_count: 0,
            last_reset_date: today,
            ..self
        }
    }

    /// Returns true when reconciling against `today` would change the ledger.
    pub fn needs_rollover(&self, today: NaiveDate) -> bool {
        self.last_reset_date != today
    }

    /// Count one generated mockup. Never refuses; quota checks happen before.
    pub fn record_generation(self, today: NaiveDate) -> Self {
        let ledger = self.reconcile_daily_window(today);
        Self {
            daily_count: ledger.daily_count.saturating_add(1),
            lifetime_count: ledger.lifetime_count.saturating_add(1),
            ..ledger
        }
    }

    /// Switch to a confirmed plan. Any running trial is cleared.
    pub fn apply_plan_change(self, new_tier: PlanTier) -> Self {
        Self {
            plan_tier: new_tier,
            is_trialing: false,
            trial_ends_at: None,
            ..self
        }
    }

    /// Start a Pro trial lasting `duration_days` from `now`.
    pub fn start_trial(self, now: Timestamp, duration_days: u32) -> Self {
        Self {
            plan_tier: PlanTier::Pro,
            is_trialing: true,
            trial_ends_at: Some(now.add_days(i64::from(duration_days))),
            ..self
        }
    }
}
