//! ExportMockupHandler - Decides how a generated mockup may be downloaded.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::paywall::{
    ActionContext, Evaluation, PaywallError, PaywallMessage, PaywallTrigger, Signal,
    TriggerEvaluator, UserAction,
};
use crate::domain::plan::ExportQuality;
use crate::ports::{GeneratedImage, NotificationSink};

use super::super::paywall::DeviceState;
use super::MockupError;

/// Command to export the current mockup.
#[derive(Debug, Clone)]
pub struct ExportMockupCommand {
    pub image: Option<GeneratedImage>,
    pub quality: ExportQuality,
    /// The user is fine with a watermarked file. When false, a watermark
    /// requirement raises the watermark-removal paywall instead.
    pub accept_watermark: bool,
    pub context: ActionContext,
}

/// How the file should be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPlan {
    pub quality: ExportQuality,
    pub watermark: bool,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportMockupOutcome {
    Ready {
        plan: ExportPlan,
        signals: Vec<Signal>,
    },
    Blocked {
        trigger: PaywallTrigger,
        message: PaywallMessage,
    },
}

/// Handler for mockup export. Exports are not counted against any quota.
pub struct ExportMockupHandler {
    evaluator: TriggerEvaluator,
    sink: Arc<dyn NotificationSink>,
}

impl ExportMockupHandler {
    pub fn new(evaluator: TriggerEvaluator, sink: Arc<dyn NotificationSink>) -> Self {
        Self { evaluator, sink }
    }

    pub fn handle(
        &self,
        state: &mut DeviceState,
        cmd: ExportMockupCommand,
    ) -> Result<ExportMockupOutcome, MockupError> {
        if cmd.image.is_none() {
            return Err(PaywallError::MissingGeneratedImage.into());
        }

        let evaluation = self.evaluator.evaluate(
            &UserAction::Export {
                quality: cmd.quality,
            },
            &state.ledger,
            &cmd.context,
        );

        if let Evaluation::Block { trigger, message } = evaluation {
            let watermark_accepted =
                cmd.accept_watermark && trigger == PaywallTrigger::WatermarkRemoval;
            if !watermark_accepted {
                state.session.open(trigger.clone(), message.clone());
                tracing::info!(
                    device_id = %state.device_id,
                    trigger = %trigger,
                    "Paywall opened"
                );
                return Ok(ExportMockupOutcome::Blocked { trigger, message });
            }
        }

        let watermark = self
            .evaluator
            .table()
            .resolve(state.ledger.plan_tier)
            .watermark_required;

        let mut signals = Vec::new();
        if watermark {
            signals.push(Signal::warning("Watermark applied. Upgrade to remove."));
        }
        signals.push(Signal::celebration("Exported successfully!"));
        self.sink.notify_all(&signals);

        let plan = ExportPlan {
            quality: cmd.quality,
            watermark,
            file_name: format!(
                "ad-mockup-{}-{}.png",
                cmd.quality.label(),
                cmd.context.now.as_datetime().timestamp_millis()
            ),
        };

        tracing::info!(
            device_id = %state.device_id,
            quality = cmd.quality.label(),
            watermark,
            "Mockup exported"
        );

        Ok(ExportMockupOutcome::Ready { plan, signals })
    }
}
