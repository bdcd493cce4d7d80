//! GenerateMockupHandler - Upload + placement in, composited mockup out.

use std::sync::Arc;

use crate::domain::mockup::PlacementCatalog;
use crate::domain::paywall::{
    ActionContext, Evaluation, PaywallError, PaywallMessage, PaywallTrigger, Signal,
    TriggerEvaluator, UserAction,
};
use crate::ports::{
    GeneratedImage, GenerationRequest, ImageGenerator, NotificationSink, UsageLedgerStore,
};

use super::super::paywall::{
    DeviceState, GuardActionCommand, GuardActionHandler, RecordGenerationHandler,
};
use super::MockupError;

/// A product image supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Upload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    fn validate(&self) -> Result<(), PaywallError> {
        if self.bytes.is_empty() {
            return Err(PaywallError::invalid_upload("the file is empty"));
        }
        if !self.mime_type.starts_with("image/") {
            return Err(PaywallError::invalid_upload(format!(
                "{} is not an image type",
                self.mime_type
            )));
        }
        Ok(())
    }
}

/// Command to generate a mockup.
#[derive(Debug, Clone)]
pub struct GenerateMockupCommand {
    pub upload: Option<Upload>,
    pub format_id: String,
    pub context: ActionContext,
}

/// A successfully generated mockup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMockup {
    pub image: GeneratedImage,
    pub format_id: String,
    /// Every signal routed to the sink during this call.
    pub signals: Vec<Signal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateMockupOutcome {
    Generated(GeneratedMockup),
    /// A paywall was opened instead. Nothing was counted.
    Blocked {
        trigger: PaywallTrigger,
        message: PaywallMessage,
    },
}

/// Handler for mockup generation.
///
/// Order of operations:
/// 1. Input checks (upload, placement id); failures touch nothing
/// 2. Template and daily-quota guards; a block opens the paywall
/// 3. Count the generation (persist then commit)
/// 4. Call the image generator; a failure here keeps the count
pub struct GenerateMockupHandler {
    guard: GuardActionHandler,
    recorder: RecordGenerationHandler,
    generator: Arc<dyn ImageGenerator>,
    catalog: Arc<PlacementCatalog>,
    sink: Arc<dyn NotificationSink>,
}

impl GenerateMockupHandler {
    pub fn new(
        evaluator: TriggerEvaluator,
        store: Arc<dyn UsageLedgerStore>,
        generator: Arc<dyn ImageGenerator>,
        catalog: Arc<PlacementCatalog>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            guard: GuardActionHandler::new(evaluator, store.clone(), sink.clone()),
            recorder: RecordGenerationHandler::new(store),
            generator,
            catalog,
            sink,
        }
    }

    pub async fn handle(
        &self,
        state: &mut DeviceState,
        cmd: GenerateMockupCommand,
    ) -> Result<GenerateMockupOutcome, MockupError> {
        // 1. Input errors
        let upload = cmd.upload.ok_or(PaywallError::MissingUpload)?;
        upload.validate()?;
        let format = self.catalog.require(&cmd.format_id)?;

        // 2. Guards
        let mut signals = Vec::new();
        let guards = [
            UserAction::SelectTemplate {
                template_id: format.id.clone(),
            },
            UserAction::Generate,
        ];
        for action in guards {
            match self
                .guard
                .handle(state, GuardActionCommand::new(action, cmd.context))
                .await?
            {
                Evaluation::Block { trigger, message } => {
                    return Ok(GenerateMockupOutcome::Blocked { trigger, message });
                }
                Evaluation::Proceed {
                    signals: routed, ..
                } => signals.extend(routed),
            }
        }

        // 3. Count it
        let recorded = self.recorder.handle(state, cmd.context.now).await?;
        if let Some(milestone) = recorded.milestone {
            self.sink.notify(&milestone);
            signals.push(milestone);
        }

        // 4. Generate
        let request = GenerationRequest {
            image_bytes: upload.bytes,
            mime_type: upload.mime_type,
            prompt: format.prompt.clone(),
        };
        let image = self.generator.generate(request).await.map_err(|e| {
            tracing::warn!(
                device_id = %state.device_id,
                format_id = %format.id,
                error = %e,
                "Mockup generation failed after counting"
            );
            MockupError::Generation(e)
        })?;

        tracing::info!(
            device_id = %state.device_id,
            format_id = %format.id,
            daily_count = recorded.daily_count,
            "Mockup generated"
        );

        Ok(GenerateMockupOutcome::Generated(GeneratedMockup {
            image,
            format_id: format.id.clone(),
            signals,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gemini::MockImageGenerator;
    use crate::adapters::notification::CollectingNotificationSink;
    use crate::adapters::storage::InMemoryLedgerStore;
    use crate::domain::foundation::{DeviceId, Timestamp};
    use crate::domain::paywall::Severity;
    use crate::domain::plan::{EntitlementTable, PlanTier};
    use crate::domain::usage::UsageLedger;
    use crate::ports::GenerationError;

    struct Fixture {
        handler: GenerateMockupHandler,
        store: InMemoryLedgerStore,
        generator: MockImageGenerator,
        sink: CollectingNotificationSink,
    }

    fn fixture(generator: MockImageGenerator) -> Fixture {
        let store = InMemoryLedgerStore::new();
        let sink = CollectingNotificationSink::new();
        let handler = GenerateMockupHandler::new(
            TriggerEvaluator::new(Arc::new(EntitlementTable::default())),
            Arc::new(store.clone()),
            Arc::new(generator.clone()),
            Arc::new(PlacementCatalog::default()),
            Arc::new(sink.clone()),
        );
        Fixture {
            handler,
            store,
            generator,
            sink,
        }
    }

    fn state_with(tier: PlanTier, daily: u32, lifetime: u64) -> DeviceState {
        let ledger = UsageLedger {
            plan_tier: tier,
            daily_count: daily,
            lifetime_count: lifetime,
            ..UsageLedger::new_free(Timestamp::now().date())
        };
        DeviceState::new(DeviceId::new("device-1").unwrap(), ledger)
    }

    fn command(format_id: &str) -> GenerateMockupCommand {
        GenerateMockupCommand {
            upload: Some(Upload::new(vec![1, 2, 3], "image/png")),
            format_id: format_id.to_string(),
            context: ActionContext::now(),
        }
    }

    #[tokio::test]
    async fn first_generation_celebrates() {
        let f = fixture(MockImageGenerator::new().with_image("data:image/png;base64,AAAA"));
        let mut state = state_with(PlanTier::Free, 0, 0);

        let outcome = f.handler.handle(&mut state, command("billboard-nyc")).await.unwrap();

        let GenerateMockupOutcome::Generated(mockup) = outcome else {
            panic!("expected a generated mockup");
        };
        assert_eq!(mockup.image.data_uri, "data:image/png;base64,AAAA");
        assert_eq!(mockup.signals.len(), 1);
        assert_eq!(mockup.signals[0].severity, Severity::Celebration);
        assert_eq!(state.ledger.daily_count, 1);
        assert_eq!(state.ledger.lifetime_count, 1);
        assert_eq!(f.generator.calls()[0].prompt, PlacementCatalog::default().get("billboard-nyc").unwrap().prompt);
    }

    #[tokio::test]
    async fn last_free_unit_warns() {
        let f = fixture(MockImageGenerator::new());
        let mut state = state_with(PlanTier::Free, 2, 5);

        let outcome = f.handler.handle(&mut state, command("bus-stop")).await.unwrap();

        assert!(matches!(outcome, GenerateMockupOutcome::Generated(_)));
        assert_eq!(f.sink.count(Severity::Warning), 1);
        assert_eq!(state.ledger.daily_count, 3);
    }

    #[tokio::test]
    async fn daily_limit_blocks_without_counting() {
        let f = fixture(MockImageGenerator::new());
        let mut state = state_with(PlanTier::Free, 3, 3);

        let outcome = f.handler.handle(&mut state, command("bus-stop")).await.unwrap();

        assert!(matches!(
            outcome,
            GenerateMockupOutcome::Blocked {
                trigger: PaywallTrigger::DailyLimitReached,
                ..
            }
        ));
        assert!(state.session.is_open());
        assert_eq!(state.ledger.daily_count, 3);
        assert_eq!(f.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn locked_template_blocks() {
        let f = fixture(MockImageGenerator::new());
        let mut state = state_with(PlanTier::Free, 0, 0);

        let outcome = f.handler.handle(&mut state, command("art-gallery")).await.unwrap();

        assert!(matches!(
            outcome,
            GenerateMockupOutcome::Blocked {
                trigger: PaywallTrigger::TemplateLocked { .. },
                ..
            }
        ));
        assert_eq!(f.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn input_errors_touch_nothing() {
        let f = fixture(MockImageGenerator::new());
        let mut state = state_with(PlanTier::Free, 0, 0);

        let mut missing = command("billboard-nyc");
        missing.upload = None;
        let err = f.handler.handle(&mut state, missing).await.unwrap_err();
        assert!(matches!(err, MockupError::Input(PaywallError::MissingUpload)));

        let mut not_image = command("billboard-nyc");
        not_image.upload = Some(Upload::new(vec![1], "application/pdf"));
        let err = f.handler.handle(&mut state, not_image).await.unwrap_err();
        assert!(matches!(err, MockupError::Input(PaywallError::InvalidUpload { .. })));

        let err = f.handler.handle(&mut state, command("moon-billboard")).await.unwrap_err();
        assert!(matches!(err, MockupError::Input(PaywallError::UnknownPlacement(_))));

        assert_eq!(state.ledger.lifetime_count, 0);
        assert!(f.store.is_empty().await);
        assert!(!state.session.is_open());
    }

    #[tokio::test]
    async fn generator_failure_keeps_the_count() {
        let f = fixture(MockImageGenerator::new().with_failure(GenerationError::NoImageProduced));
        let mut state = state_with(PlanTier::Starter, 4, 4);

        let err = f.handler.handle(&mut state, command("cafe-table")).await.unwrap_err();

        assert!(matches!(err, MockupError::Generation(GenerationError::NoImageProduced)));
        assert_eq!(state.ledger.daily_count, 5);
        assert_eq!(f.store.get(&state.device_id).await.unwrap().daily_count, 5);
    }

    #[tokio::test]
    async fn storage_failure_stops_before_generating() {
        let f = fixture(MockImageGenerator::new());
        f.store.fail_saves(true);
        let mut state = state_with(PlanTier::Pro, 0, 0);

        let err = f.handler.handle(&mut state, command("art-gallery")).await.unwrap_err();

        assert!(matches!(err, MockupError::Storage(_)));
        assert_eq!(state.ledger.lifetime_count, 0);
        assert_eq!(f.generator.call_count(), 0);
    }
}
