//! Paywall message payloads and the catalog that selects them.

use serde::{Deserialize, Serialize};

use super::PaywallTrigger;
use crate::domain::plan::ExportQuality;
use crate::domain::usage::UsageLedger;

/// Display payload for an open paywall. Opaque to the decision logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaywallMessage {
    pub headline: String,
    pub subheadline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_proof: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<String>,
}

impl PaywallMessage {
    pub fn new(headline: impl Into<String>, subheadline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            subheadline: subheadline.into(),
            urgency: None,
            social_proof: None,
            offer: None,
        }
    }

    pub fn with_urgency(mut self, urgency: impl Into<String>) -> Self {
        self.urgency = Some(urgency.into());
        self
    }

    pub fn with_social_proof(mut self, social_proof: impl Into<String>) -> Self {
        self.social_proof = Some(social_proof.into());
        self
    }

    pub fn with_offer(mut self, offer: impl Into<String>) -> Self {
        self.offer = Some(offer.into());
        self
    }
}

/// Static table with one message template per trigger.
///
/// Selection is a pure function of the trigger and the ledger snapshot.
pub struct MessageCatalog;

impl MessageCatalog {
    pub fn message_for(trigger: &PaywallTrigger, ledger: &UsageLedger) -> PaywallMessage {
        match trigger {
            PaywallTrigger::DailyLimitReached => PaywallMessage::new(
                "You're on a roll today",
                format!(
                    "You've made {} mockups today. Keep going without waiting for tomorrow.",
                    ledger.daily_count
                ),
            )
            .with_urgency("Unlock unlimited mockups now")
            .with_social_proof("Thousands of marketers upgraded this week")
            .with_offer("50% off your first month"),

            PaywallTrigger::ExportQualityLocked { quality } => match quality {
                ExportQuality::Uhd4k => PaywallMessage::new(
                    "Ready for Ultra HD?",
                    "4K exports stay sharp on retina screens and large prints.",
                )
                .with_urgency("Premium quality for premium brands")
                .with_offer("Get 4K exports and every template"),
                _ => PaywallMessage::new(
                    "Your ad looks great",
                    format!("Export it in {} so the detail holds up.", quality),
                )
                .with_urgency("See the HD difference instantly")
                .with_offer("Unlock HD and remove the watermark"),
            },

            PaywallTrigger::TemplateLocked { .. } => PaywallMessage::new(
                "Unlock premium templates",
                "This placement is part of a paid plan.",
            )
            .with_urgency("Get every placement template")
            .with_offer("Unlock all templates and unlimited mockups"),

            PaywallTrigger::WatermarkRemoval => PaywallMessage::new(
                "Go professional",
                "Your brand deserves clean, watermark-free ads.",
            )
            .with_urgency("Start exporting without the watermark today")
            .with_offer("Remove the watermark and get HD exports"),

            PaywallTrigger::TimeInvestment {
                time_spent_secs, ..
            } => PaywallMessage::new(
                "You've created something special",
                format!(
                    "You spent {} minutes perfecting this. Don't export it in low quality.",
                    (time_spent_secs + 30) / 60
                ),
            )
            .with_urgency("Export in HD before you move on")
            .with_offer("Upgrade now for full-quality exports"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ledger(daily: u32) -> UsageLedger {
        UsageLedger {
            daily_count: daily,
            ..UsageLedger::new_free(NaiveDate::from_ymd_opt(2026, 5, 4).unwrap())
        }
    }

    #[test]
    fn daily_limit_message_mentions_todays_count() {
        let msg = MessageCatalog::message_for(&PaywallTrigger::DailyLimitReached, &ledger(3));
        assert!(msg.subheadline.contains("3 mockups"));
        assert!(msg.offer.is_some());
    }

    #[test]
    fn selection_is_deterministic() {
        let trigger = PaywallTrigger::WatermarkRemoval;
        assert_eq!(
            MessageCatalog::message_for(&trigger, &ledger(1)),
            MessageCatalog::message_for(&trigger, &ledger(1))
        );
    }

    #[test]
    fn quality_message_differs_for_4k() {
        let hd = MessageCatalog::message_for(
            &PaywallTrigger::ExportQualityLocked {
                quality: ExportQuality::Hd1080,
            },
            &ledger(0),
        );
        let uhd = MessageCatalog::message_for(
            &PaywallTrigger::ExportQualityLocked {
                quality: ExportQuality::Uhd4k,
            },
            &ledger(0),
        );
        assert_ne!(hd.headline, uhd.headline);
        assert!(hd.subheadline.contains("1080p"));
    }

    #[test]
    fn time_investment_message_rounds_minutes() {
        let msg = MessageCatalog::message_for(
            &PaywallTrigger::TimeInvestment {
                time_spent_secs: 450,
                edit_count: 5,
            },
            &ledger(0),
        );
        assert!(msg.subheadline.contains("8 minutes"));
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let json = serde_json::to_value(PaywallMessage::new("a", "b")).unwrap();
        assert!(json.get("urgency").is_none());
        assert_eq!(json["headline"], "a");
    }
}
