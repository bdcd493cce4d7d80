//! Plan tier definitions.
//!
//! Represents the subscription levels a user of AdGenius can be on.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Subscription plan tier.
///
/// Determines entitlements through the entitlement table; nothing about a
/// tier's capabilities is computed ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Free tier - daily quota, watermark, SD exports only.
    Free,

    /// Entry paid tier - larger quota, HD exports, no watermark.
    Starter,

    /// Full self-serve tier - unlimited mockups, 4K, every template.
    /// Trials always run on this tier.
    Pro,

    /// Team tier sold through sales. Older clients call it "business".
    #[serde(alias = "business")]
    Agency,
}

impl PlanTier {
    /// Every tier, lowest first.
    pub const ALL: [PlanTier; 4] = [
        PlanTier::Free,
        PlanTier::Starter,
        PlanTier::Pro,
        PlanTier::Agency,
    ];

    /// Returns true if this tier is a paid tier.
    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanTier::Free)
    }

    /// Returns true when choosing this tier hands off to a sales contact
    /// workflow instead of a trial or a self-serve checkout.
    pub fn requires_sales_contact(&self) -> bool {
        matches!(self, PlanTier::Agency)
    }

    /// Returns the wire name for this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Starter => "starter",
            PlanTier::Pro => "pro",
            PlanTier::Agency => "agency",
        }
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanTier::Free => "Free",
            PlanTier::Starter => "Starter",
            PlanTier::Pro => "Pro",
            PlanTier::Agency => "Agency",
        }
    }

    /// Returns the numeric rank of this tier for comparison.
    ///
    /// Higher rank = more features.
    pub fn rank(&self) -> u8 {
        match self {
            PlanTier::Free => 0,
            PlanTier::Starter => 1,
            PlanTier::Pro => 2,
            PlanTier::Agency => 3,
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PlanTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "starter" => Ok(PlanTier::Starter),
            "pro" => Ok(PlanTier::Pro),
            "agency" | "business" => Ok(PlanTier::Agency),
            other => Err(ValidationError::invalid_format(
                "plan_tier",
                format!("unknown plan tier '{}'", other),
            )),
        }
    }
}
