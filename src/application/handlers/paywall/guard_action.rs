//! GuardActionHandler - Runs a user action past the trigger evaluator.

use std::sync::Arc;

use crate::domain::paywall::{ActionContext, Evaluation, TriggerEvaluator, UserAction};
use crate::ports::{LedgerStoreError, NotificationSink, UsageLedgerStore};

use super::DeviceState;

/// Command to check whether an action may proceed.
#[derive(Debug, Clone)]
pub struct GuardActionCommand {
    pub action: UserAction,
    pub context: ActionContext,
}

impl GuardActionCommand {
    pub fn new(action: UserAction, context: ActionContext) -> Self {
        Self { action, context }
    }
}

/// Handler that evaluates an action and updates the paywall session.
///
/// - A date rollover is persisted before evaluating
/// - `Block` opens (or replaces) the device's paywall
/// - `Proceed` signals are routed to the notification sink
/// - Deferred prompts are returned untouched for the caller to schedule
pub struct GuardActionHandler {
    evaluator: TriggerEvaluator,
    store: Arc<dyn UsageLedgerStore>,
    sink: Arc<dyn NotificationSink>,
}

impl GuardActionHandler {
    pub fn new(
        evaluator: TriggerEvaluator,
        store: Arc<dyn UsageLedgerStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            evaluator,
            store,
            sink,
        }
    }

    pub async fn handle(
        &self,
        state: &mut DeviceState,
        cmd: GuardActionCommand,
    ) -> Result<Evaluation, LedgerStoreError> {
        let today = cmd.context.today();

        // 1. Persist the new daily window so a restart sees it too
        if state.ledger.needs_rollover(today) {
            let reconciled = state.ledger.clone().reconcile_daily_window(today);
            state.commit(self.store.as_ref(), reconciled).await?;
            tracing::debug!(device_id = %state.device_id, %today, "Daily usage window rolled over");
        }

        // 2. Decide
        let evaluation = self
            .evaluator
            .evaluate(&cmd.action, &state.ledger, &cmd.context);

        // 3. Surface the result
        match &evaluation {
            Evaluation::Block { trigger, .. } => {
                state.session.apply(&evaluation);
                tracing::info!(
                    device_id = %state.device_id,
                    tier = state.ledger.plan_tier.as_str(),
                    trigger = %trigger,
                    "Paywall opened"
                );
            }
            Evaluation::Proceed { signals, deferred } => {
                self.sink.notify_all(signals);
                if let Some(deferred) = deferred {
                    tracing::debug!(
                        device_id = %state.device_id,
                        trigger = %deferred.trigger,
                        "Deferred paywall prompt"
                    );
                }
            }
        }

        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notification::CollectingNotificationSink;
    use crate::adapters::storage::InMemoryLedgerStore;
    use crate::domain::foundation::{DeviceId, Timestamp};
    use crate::domain::paywall::{PaywallTrigger, Severity};
    use crate::domain::plan::{EntitlementTable, ExportQuality, PlanTier};
    use crate::domain::usage::UsageLedger;
    use chrono::NaiveDate;

    fn noon(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_datetime(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
                .and_utc(),
        )
    }

    struct Fixture {
        handler: GuardActionHandler,
        store: InMemoryLedgerStore,
        sink: CollectingNotificationSink,
    }

    fn fixture() -> Fixture {
        let store = InMemoryLedgerStore::new();
        let sink = CollectingNotificationSink::new();
        let handler = GuardActionHandler::new(
            TriggerEvaluator::new(Arc::new(EntitlementTable::default())),
            Arc::new(store.clone()),
            Arc::new(sink.clone()),
        );
        Fixture {
            handler,
            store,
            sink,
        }
    }

    fn state(tier: PlanTier, daily: u32, day: Timestamp) -> DeviceState {
        let ledger = UsageLedger {
            plan_tier: tier,
            daily_count: daily,
            lifetime_count: u64::from(daily),
            ..UsageLedger::new_free(day.date())
        };
        DeviceState::new(DeviceId::new("device-1").unwrap(), ledger)
    }

    #[tokio::test]
    async fn block_opens_the_session() {
        let f = fixture();
        let now = noon(2026, 4, 1);
        let mut state = state(PlanTier::Free, 3, now);

        let evaluation = f
            .handler
            .handle(
                &mut state,
                GuardActionCommand::new(UserAction::Generate, ActionContext::at(now)),
            )
            .await
            .unwrap();

        assert!(evaluation.is_blocked());
        assert!(state.session.is_open());
        assert_eq!(
            state.session.active_trigger(),
            Some(&PaywallTrigger::DailyLimitReached)
        );
        assert!(f.sink.received().is_empty());
    }

    #[tokio::test]
    async fn last_unit_warning_is_routed_to_sink() {
        let f = fixture();
        let now = noon(2026, 4, 1);
        let mut state = state(PlanTier::Free, 2, now);

        let evaluation = f
            .handler
            .handle(
                &mut state,
                GuardActionCommand::new(UserAction::Generate, ActionContext::at(now)),
            )
            .await
            .unwrap();

        assert!(!evaluation.is_blocked());
        assert!(!state.session.is_open());
        assert_eq!(f.sink.count(Severity::Warning), 1);
    }

    #[tokio::test]
    async fn rollover_is_persisted_before_evaluating() {
        let f = fixture();
        let yesterday = noon(2026, 4, 1);
        let today = noon(2026, 4, 2);
        let mut state = state(PlanTier::Free, 3, yesterday);

        let evaluation = f
            .handler
            .handle(
                &mut state,
                GuardActionCommand::new(UserAction::Generate, ActionContext::at(today)),
            )
            .await
            .unwrap();

        assert!(!evaluation.is_blocked());
        assert_eq!(state.ledger.daily_count, 0);
        assert_eq!(state.ledger.last_reset_date, today.date());
        let stored = f.store.get(&state.device_id).await.unwrap();
        assert_eq!(stored.last_reset_date, today.date());
    }

    #[tokio::test]
    async fn rollover_persist_failure_is_reported() {
        let f = fixture();
        f.store.fail_saves(true);
        let mut state = state(PlanTier::Free, 3, noon(2026, 4, 1));
        let before = state.ledger.clone();

        let result = f
            .handler
            .handle(
                &mut state,
                GuardActionCommand::new(
                    UserAction::Generate,
                    ActionContext::at(noon(2026, 4, 2)),
                ),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(state.ledger, before);
        assert!(!state.session.is_open());
    }

    #[tokio::test]
    async fn second_block_replaces_payload() {
        let f = fixture();
        let now = noon(2026, 4, 1);
        let mut state = state(PlanTier::Free, 0, now);

        f.handler
            .handle(
                &mut state,
                GuardActionCommand::new(
                    UserAction::SelectTemplate {
                        template_id: "art-gallery".to_string(),
                    },
                    ActionContext::at(now),
                ),
            )
            .await
            .unwrap();
        f.handler
            .handle(
                &mut state,
                GuardActionCommand::new(
                    UserAction::Export {
                        quality: ExportQuality::Uhd4k,
                    },
                    ActionContext::at(now),
                ),
            )
            .await
            .unwrap();

        assert_eq!(
            state.session.active_trigger(),
            Some(&PaywallTrigger::ExportQualityLocked {
                quality: ExportQuality::Uhd4k
            })
        );
    }

    #[tokio::test]
    async fn deferred_prompt_does_not_open_session() {
        let f = fixture();
        let now = noon(2026, 4, 1);
        let mut state = state(PlanTier::Free, 1, now);

        let evaluation = f
            .handler
            .handle(
                &mut state,
                GuardActionCommand::new(
                    UserAction::TrackTime {
                        time_spent_secs: 420,
                        edit_count: 5,
                    },
                    ActionContext::at(now),
                ),
            )
            .await
            .unwrap();

        assert!(matches!(
            evaluation,
            Evaluation::Proceed {
                deferred: Some(_),
                ..
            }
        ));
        assert!(!state.session.is_open());
    }
}
