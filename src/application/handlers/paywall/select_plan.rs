//! SelectPlanHandler - Resolves an open paywall with the plan the user picked.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::domain::paywall::{PaywallError, Signal};
use crate::domain::plan::{BillingPeriod, PlanTier};
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, LedgerStoreError, NotificationSink, PaymentError,
    PaymentProvider, UsageLedgerStore,
};

use super::DeviceState;

/// Default trial length when nothing is configured.
pub const DEFAULT_TRIAL_DAYS: u32 = 7;

/// How a paid selection is fulfilled. Exactly one path runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanFulfilment {
    /// Start a local Pro trial.
    StartTrial,
    /// Hand off to hosted checkout.
    Checkout { customer_email: Option<String> },
}

/// Command to select a plan from the open paywall.
#[derive(Debug, Clone)]
pub struct SelectPlanCommand {
    pub tier: PlanTier,
    pub billing_period: BillingPeriod,
    pub fulfilment: PlanFulfilment,
    pub now: Timestamp,
}

/// What happened after the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectPlanOutcome {
    /// Tier is sold through sales; the ledger is untouched.
    ContactSales { tier: PlanTier },
    TrialStarted {
        trial_ends_at: Timestamp,
        trial_days: u32,
    },
    CheckoutStarted { session: CheckoutSession },
}

/// Settings for plan selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSelectionConfig {
    pub trial_days: u32,
    pub success_url: String,
    pub cancel_url: String,
    pub launch_coupon: Option<String>,
}

impl PlanSelectionConfig {
    /// Checkout URLs derived from the frontend origin.
    pub fn for_frontend(frontend_url: &str) -> Self {
        let base = frontend_url.trim_end_matches('/');
        Self {
            trial_days: DEFAULT_TRIAL_DAYS,
            success_url: format!("{}/success?session_id={{CHECKOUT_SESSION_ID}}", base),
            cancel_url: format!("{}/pricing", base),
            launch_coupon: None,
        }
    }

    pub fn with_trial_days(mut self, days: u32) -> Self {
        self.trial_days = days;
        self
    }

    pub fn with_launch_coupon(mut self, coupon: Option<String>) -> Self {
        self.launch_coupon = coupon.filter(|c| !c.trim().is_empty());
        self
    }
}

/// Errors from plan selection.
///
/// Every variant leaves the paywall open with its original payload.
#[derive(Debug, thiserror::Error)]
pub enum PlanSelectionError {
    #[error(transparent)]
    Paywall(#[from] PaywallError),

    #[error("The {0} plan cannot be selected from a paywall")]
    NotSelectable(PlanTier),

    #[error("No trial is offered for the {0} plan")]
    TrialUnavailable(PlanTier),

    #[error("Billing handoff failed: {0}")]
    Billing(#[from] PaymentError),

    #[error(transparent)]
    Storage(#[from] LedgerStoreError),
}

impl PlanSelectionError {
    /// Billing and storage failures can be retried by the user.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlanSelectionError::Billing(_) | PlanSelectionError::Storage(_)
        )
    }
}

impl From<PlanSelectionError> for DomainError {
    fn from(err: PlanSelectionError) -> Self {
        match err {
            PlanSelectionError::Paywall(e) => e.into(),
            PlanSelectionError::Billing(e) => e.into(),
            PlanSelectionError::Storage(e) => e.into(),
            other => DomainError::new(ErrorCode::ValidationFailed, other.to_string()),
        }
    }
}

/// Handler for plan selection.
///
/// The session closes only once the chosen path has succeeded. If the billing
/// handoff fails, or its future is dropped before completing, the session stays
/// open with the same trigger and message.
pub struct SelectPlanHandler {
    store: Arc<dyn UsageLedgerStore>,
    payment_provider: Arc<dyn PaymentProvider>,
    sink: Arc<dyn NotificationSink>,
    config: PlanSelectionConfig,
}

impl SelectPlanHandler {
    pub fn new(
        store: Arc<dyn UsageLedgerStore>,
        payment_provider: Arc<dyn PaymentProvider>,
        sink: Arc<dyn NotificationSink>,
        config: PlanSelectionConfig,
    ) -> Self {
        Self {
            store,
            payment_provider,
            sink,
            config,
        }
    }

    pub async fn handle(
        &self,
        state: &mut DeviceState,
        cmd: SelectPlanCommand,
    ) -> Result<SelectPlanOutcome, PlanSelectionError> {
        // 1. A selection only makes sense against a showing paywall
        let trigger = state.session.ensure_open()?.trigger.clone();

        if !cmd.tier.is_paid() {
            return Err(PlanSelectionError::NotSelectable(cmd.tier));
        }

        // 2. Contact-sales tiers close the paywall and touch nothing else
        if cmd.tier.requires_sales_contact() {
            state.session.close_for_selection()?;
            tracing::info!(
                device_id = %state.device_id,
                tier = cmd.tier.as_str(),
                trigger = %trigger,
                "Plan selection handed to sales"
            );
            return Ok(SelectPlanOutcome::ContactSales { tier: cmd.tier });
        }

        // 3. Exactly one of trial or checkout
        let outcome = match &cmd.fulfilment {
            PlanFulfilment::StartTrial => {
                if cmd.tier != PlanTier::Pro {
                    return Err(PlanSelectionError::TrialUnavailable(cmd.tier));
                }
                let next = state
                    .ledger
                    .clone()
                    .start_trial(cmd.now, self.config.trial_days);
                state.commit(self.store.as_ref(), next).await?;

                let trial_ends_at = state
                    .ledger
                    .trial_ends_at
                    .unwrap_or_else(|| cmd.now.add_days(i64::from(self.config.trial_days)));
                self.sink.notify(&Signal::celebration(format!(
                    "Your {}-day Pro trial has started!",
                    self.config.trial_days
                )));
                SelectPlanOutcome::TrialStarted {
                    trial_ends_at,
                    trial_days: self.config.trial_days,
                }
            }
            PlanFulfilment::Checkout { customer_email } => {
                let request = self.checkout_request(&cmd, customer_email.clone(), trigger.name());
                let session = self
                    .payment_provider
                    .create_checkout_session(request)
                    .await
                    .map_err(|e| {
                        tracing::warn!(
                            device_id = %state.device_id,
                            tier = cmd.tier.as_str(),
                            error = %e,
                            "Checkout handoff failed; paywall stays open"
                        );
                        PlanSelectionError::Billing(e)
                    })?;
                self.sink
                    .notify(&Signal::info("Redirecting to secure checkout..."));
                SelectPlanOutcome::CheckoutStarted { session }
            }
        };

        // 4. Only now does the paywall close
        state.session.close_for_selection()?;
        tracing::info!(
            device_id = %state.device_id,
            tier = cmd.tier.as_str(),
            trigger = %trigger,
            "Plan selected"
        );

        Ok(outcome)
    }

    fn checkout_request(
        &self,
        cmd: &SelectPlanCommand,
        customer_email: Option<String>,
        trigger_name: &str,
    ) -> CreateCheckoutRequest {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), "paywall".to_string());
        metadata.insert("trigger".to_string(), trigger_name.to_string());

        CreateCheckoutRequest {
            tier: cmd.tier,
            billing_period: cmd.billing_period,
            customer_email,
            trial_days: Some(self.config.trial_days),
            success_url: self.config.success_url.clone(),
            cancel_url: self.config.cancel_url.clone(),
            coupon: self.config.launch_coupon.clone(),
            metadata,
        }
    }
}
