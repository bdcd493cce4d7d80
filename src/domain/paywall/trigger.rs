//! Reasons a paywall is raised.

use serde::{Deserialize, Serialize};

use crate::domain::plan::ExportQuality;

/// Why a user action was stopped (or flagged) for a paywall.
///
/// Each variant carries only the context its message needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaywallTrigger {
    /// Free daily quota used up.
    DailyLimitReached,

    /// Requested export resolution is not in the plan.
    ExportQualityLocked { quality: ExportQuality },

    /// Placement template is not in the plan's allowlist.
    TemplateLocked { template_id: String },

    /// Export would carry the free-tier watermark.
    WatermarkRemoval,

    /// User has invested enough time in a mockup to be worth prompting.
    TimeInvestment { time_spent_secs: u64, edit_count: u32 },
}

impl PaywallTrigger {
    /// Stable name used in logs and analytics events.
    pub fn name(&self) -> &'static str {
        match self {
            PaywallTrigger::DailyLimitReached => "daily_limit_reached",
            PaywallTrigger::ExportQualityLocked { .. } => "export_quality_locked",
            PaywallTrigger::TemplateLocked { .. } => "template_locked",
            PaywallTrigger::WatermarkRemoval => "watermark_removal",
            PaywallTrigger::TimeInvestment { .. } => "time_investment",
        }
    }
}

impl std::fmt::Display for PaywallTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaywallTrigger::ExportQualityLocked { quality } => {
                write!(f, "{}({})", self.name(), quality)
            }
            PaywallTrigger::TemplateLocked { template_id } => {
                write!(f, "{}({})", self.name(), template_id)
            }
            _ => write!(f, "{}", self.name()),
        }
    }
}
