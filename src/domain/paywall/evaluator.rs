//! Trigger evaluator - decides whether a user action may proceed.
//!
//! Rules are checked in a fixed priority order per action and the first
//! match wins. Entitlement denial is a [`Evaluation::Block`], never an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{ActionContext, MessageCatalog, PaywallMessage, PaywallTrigger, Signal, UserAction};
use crate::domain::plan::{EntitlementTable, ExportQuality, PlanTier};
use crate::domain::usage::UsageLedger;

/// Seconds of work after which a free user is worth prompting.
pub const TIME_INVESTMENT_MIN_SECS: u64 = 300;

/// Edits after which a free user is worth prompting.
pub const TIME_INVESTMENT_MIN_EDITS: u32 = 3;

/// A paywall the caller may surface later, e.g. at the next export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredPaywall {
    pub trigger: PaywallTrigger,
    pub message: PaywallMessage,
}

/// Outcome of evaluating a user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Evaluation {
    Proceed {
        signals: Vec<Signal>,
        deferred: Option<DeferredPaywall>,
    },
    Block {
        trigger: PaywallTrigger,
        message: PaywallMessage,
    },
}

impl Evaluation {
    pub fn proceed() -> Self {
        Evaluation::Proceed {
            signals: Vec::new(),
            deferred: None,
        }
    }

    fn block(trigger: PaywallTrigger, ledger: &UsageLedger) -> Self {
        let message = MessageCatalog::message_for(&trigger, ledger);
        Evaluation::Block { trigger, message }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Evaluation::Block { .. })
    }

    pub fn trigger(&self) -> Option<&PaywallTrigger> {
        match self {
            Evaluation::Block { trigger, .. } => Some(trigger),
            Evaluation::Proceed { .. } => None,
        }
    }
}

/// Evaluates actions against the entitlement table.
#[derive(Debug, Clone)]
pub struct TriggerEvaluator {
    table: Arc<EntitlementTable>,
}

impl TriggerEvaluator {
    pub fn new(table: Arc<EntitlementTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &EntitlementTable {
        &self.table
    }

    /// Decide on `action` for a snapshot of the ledger.
    ///
    /// The snapshot is reconciled against `context.today()` before any
    /// counter is read; the caller's ledger is not modified.
    pub fn evaluate(
        &self,
        action: &UserAction,
        ledger: &UsageLedger,
        context: &ActionContext,
    ) -> Evaluation {
        let ledger = ledger.clone().reconcile_daily_window(context.today());

        match action {
            UserAction::Generate => self.evaluate_generate(&ledger),
            UserAction::Export { quality } => self.evaluate_export(*quality, &ledger),
            UserAction::SelectTemplate { template_id } => {
                self.evaluate_template(template_id, &ledger)
            }
            UserAction::TrackTime {
                time_spent_secs,
                edit_count,
            } => Self::evaluate_time_investment(*time_spent_secs, *edit_count, &ledger),
        }
    }

    fn evaluate_generate(&self, ledger: &UsageLedger) -> Evaluation {
        let quota = self.table.resolve(ledger.plan_tier).max_daily_generations;
        if quota.is_unlimited() {
            return Evaluation::proceed();
        }
        if ledger.plan_tier != PlanTier::Free {
            return Evaluation::proceed();
        }

        if quota.limit_reached(ledger.daily_count) {
            return Evaluation::block(PaywallTrigger::DailyLimitReached, ledger);
        }

        let mut signals = Vec::new();
        if quota.is_last_unit(ledger.daily_count) {
            signals.push(Signal::last_free_unit());
        }
        Evaluation::Proceed {
            signals,
            deferred: None,
        }
    }

    fn evaluate_export(&self, quality: ExportQuality, ledger: &UsageLedger) -> Evaluation {
        let entitlements = self.table.resolve(ledger.plan_tier);

        if !entitlements.allows_quality(quality) {
            return Evaluation::block(PaywallTrigger::ExportQualityLocked { quality }, ledger);
        }
        if ledger.plan_tier == PlanTier::Free && entitlements.watermark_required {
            return Evaluation::block(PaywallTrigger::WatermarkRemoval, ledger);
        }
        Evaluation::proceed()
    }

    fn evaluate_template(&self, template_id: &str, ledger: &UsageLedger) -> Evaluation {
        if self.table.resolve(ledger.plan_tier).allows_template(template_id) {
            return Evaluation::proceed();
        }
        Evaluation::block(
            PaywallTrigger::TemplateLocked {
                template_id: template_id.to_string(),
            },
            ledger,
        )
    }

    fn evaluate_time_investment(
        time_spent_secs: u64,
        edit_count: u32,
        ledger: &UsageLedger,
    ) -> Evaluation {
        let invested = ledger.plan_tier == PlanTier::Free
            && time_spent_secs > TIME_INVESTMENT_MIN_SECS
            && edit_count > TIME_INVESTMENT_MIN_EDITS;
        if !invested {
            return Evaluation::proceed();
        }

        let trigger = PaywallTrigger::TimeInvestment {
            time_spent_secs,
            edit_count,
        };
        let message = MessageCatalog::message_for(&trigger, ledger);
        Evaluation::Proceed {
            signals: Vec::new(),
            deferred: Some(DeferredPaywall { trigger, message }),
        }
    }
}
