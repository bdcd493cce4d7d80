//! Plan configuration
//!
//! Quotas and capabilities per tier are data. Any tier left out of the
//! configuration keeps its built-in defaults.

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::plan::EntitlementTable;
use crate::domain::usage::MAX_TRIAL_DAYS;

#[derive(Debug, Clone, Deserialize)]
pub struct PlansConfig {
    #[serde(default)]
    pub entitlements: EntitlementTable,

    /// Length of the in-app Pro trial
    #[serde(default = "default_trial_days")]
    pub trial_days: u32,
}

impl PlansConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.trial_days == 0 || self.trial_days > MAX_TRIAL_DAYS {
            return Err(ValidationError::InvalidTrialLength);
        }
        self.entitlements.validate()?;
        Ok(())
    }
}

impl Default for PlansConfig {
    fn default() -> Self {
        Self {
            entitlements: EntitlementTable::default(),
            trial_days: default_trial_days(),
        }
    }
}

fn default_trial_days() -> u32 {
    7
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::{DailyQuota, PlanTier};

    #[test]
    fn test_defaults() {
        let config = PlansConfig::default();
        assert_eq!(config.trial_days, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_trial_is_invalid() {
        let config = PlansConfig {
            trial_days: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTrialLength)
        ));
    }

    #[test]
    fn test_partial_override_keeps_other_tiers() {
        let yaml = r#"
entitlements:
  free:
    max_daily_generations: 5
    allow_hd_export: false
    allow_4k_export: false
    watermark_required: true
    allowed_template_ids: [billboard-nyc]
"#;
        let config: PlansConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            config.entitlements.resolve(PlanTier::Free).max_daily_generations,
            DailyQuota::Limited(5)
        );
        assert_eq!(
            config.entitlements.resolve(PlanTier::Starter).max_daily_generations,
            DailyQuota::Limited(30)
        );
        assert_eq!(config.trial_days, 7);
    }
}
