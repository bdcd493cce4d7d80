//! ApplyPlanChangeHandler - Applies a plan confirmed by billing.

use std::sync::Arc;

use crate::domain::paywall::Signal;
use crate::domain::plan::PlanTier;
use crate::ports::{LedgerStoreError, NotificationSink, Subscription, UsageLedgerStore};

use super::DeviceState;

/// Command to switch the device to a confirmed plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyPlanChangeCommand {
    pub tier: PlanTier,
}

impl ApplyPlanChangeCommand {
    pub fn new(tier: PlanTier) -> Self {
        Self { tier }
    }

    /// Derive the plan from the customer's latest subscription.
    ///
    /// No subscription, or one without access, means free. Returns `None` when
    /// the subscription grants access but its price maps to no known plan.
    pub fn from_subscription(subscription: Option<&Subscription>) -> Option<Self> {
        match subscription {
            Some(sub) if sub.status.has_access() => sub.plan.map(Self::new),
            _ => Some(Self::new(PlanTier::Free)),
        }
    }
}

/// Result of a plan change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyPlanChangeResult {
    pub previous: PlanTier,
    pub current: PlanTier,
}

impl ApplyPlanChangeResult {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Handler for confirmed plan changes (e.g. after a checkout redirect).
///
/// Clears any running trial. Moving to a paid plan also dismisses a showing
/// paywall, since its reason no longer applies.
pub struct ApplyPlanChangeHandler {
    store: Arc<dyn UsageLedgerStore>,
    sink: Arc<dyn NotificationSink>,
}

impl ApplyPlanChangeHandler {
    pub fn new(store: Arc<dyn UsageLedgerStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    pub async fn handle(
        &self,
        state: &mut DeviceState,
        cmd: ApplyPlanChangeCommand,
    ) -> Result<ApplyPlanChangeResult, LedgerStoreError> {
        let previous = state.ledger.plan_tier;
        let was_trialing = state.ledger.is_trialing;

        if previous == cmd.tier && !was_trialing {
            return Ok(ApplyPlanChangeResult {
                previous,
                current: cmd.tier,
            });
        }

        let next = state.ledger.clone().apply_plan_change(cmd.tier);
        state.commit(self.store.as_ref(), next).await?;

        if cmd.tier.is_paid() {
            state.session.dismiss();
        }
        if cmd.tier.rank() > previous.rank() || (was_trialing && cmd.tier.is_paid()) {
            self.sink.notify(&Signal::celebration(format!(
                "Welcome to {}!",
                cmd.tier.display_name()
            )));
        }

        tracing::info!(
            device_id = %state.device_id,
            from = previous.as_str(),
            to = cmd.tier.as_str(),
            was_trialing,
            "Plan changed"
        );

        Ok(ApplyPlanChangeResult {
            previous,
            current: cmd.tier,
        })
    }
}
