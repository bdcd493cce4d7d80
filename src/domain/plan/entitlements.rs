//! Tier-based entitlements.
//!
//! Defines what each plan tier may do. The table is loaded from
//! configuration; [`EntitlementTable::default`] carries the shipped values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{ExportQuality, PlanTier};
use crate::domain::foundation::ValidationError;

/// How many mockups a tier may generate per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuotaRepr", into = "QuotaRepr")]
pub enum DailyQuota {
    Limited(u32),
    Unlimited,
}

impl DailyQuota {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, DailyQuota::Unlimited)
    }

    /// Check if the quota has been used up.
    ///
    /// Returns false if unlimited.
    pub fn limit_reached(&self, used_today: u32) -> bool {
        match self {
            DailyQuota::Limited(max) => used_today >= *max,
            DailyQuota::Unlimited => false,
        }
    }

    /// Returns true when exactly one unit is left today.
    pub fn is_last_unit(&self, used_today: u32) -> bool {
        match self {
            DailyQuota::Limited(max) => *max > 0 && used_today == max - 1,
            DailyQuota::Unlimited => false,
        }
    }
}

/// Wire form: a count, or the keyword `"unlimited"`.
///
/// Environment overrides arrive as strings, so numeric strings are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum QuotaRepr {
    Count(u32),
    Keyword(String),
}

impl TryFrom<QuotaRepr> for DailyQuota {
    type Error = ValidationError;

    fn try_from(repr: QuotaRepr) -> Result<Self, Self::Error> {
        match repr {
            QuotaRepr::Count(n) => Ok(DailyQuota::Limited(n)),
            QuotaRepr::Keyword(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("unlimited") {
                    return Ok(DailyQuota::Unlimited);
                }
                s.parse::<u32>().map(DailyQuota::Limited).map_err(|_| {
                    ValidationError::invalid_format(
                        "max_daily_generations",
                        format!("expected a count or \"unlimited\", got '{}'", s),
                    )
                })
            }
        }
    }
}

impl From<DailyQuota> for QuotaRepr {
    fn from(quota: DailyQuota) -> Self {
        match quota {
            DailyQuota::Limited(n) => QuotaRepr::Count(n),
            DailyQuota::Unlimited => QuotaRepr::Keyword("unlimited".to_string()),
        }
    }
}

/// Capability set granted by a plan tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlements {
    pub max_daily_generations: DailyQuota,
    pub allow_hd_export: bool,
    pub allow_4k_export: bool,
    pub watermark_required: bool,
    pub allowed_template_ids: BTreeSet<String>,
}

impl Entitlements {
    /// Unknown template ids are never allowed.
    pub fn allows_template(&self, template_id: &str) -> bool {
        self.allowed_template_ids.contains(template_id)
    }

    pub fn allows_quality(&self, quality: ExportQuality) -> bool {
        if quality.requires_hd() {
            return self.allow_hd_export;
        }
        if quality.requires_4k() {
            return self.allow_4k_export;
        }
        true
    }

    fn validate(&self, tier: PlanTier) -> Result<(), ValidationError> {
        if self.allowed_template_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(ValidationError::empty_field(format!(
                "plans.entitlements.{}.allowed_template_ids",
                tier.as_str()
            )));
        }
        Ok(())
    }
}

const FREE_TEMPLATES: &[&str] = &["billboard-nyc", "magazine-luxury", "bus-stop"];

const STARTER_TEMPLATES: &[&str] = &[
    "billboard-nyc",
    "magazine-luxury",
    "bus-stop",
    "cafe-table",
    "subway-car",
    "newspaper-vintage",
];

const ALL_TEMPLATES: &[&str] = &[
    "billboard-nyc",
    "magazine-luxury",
    "bus-stop",
    "cafe-table",
    "subway-car",
    "newspaper-vintage",
    "social-media-story",
    "music-festival",
    "art-gallery",
    "inflight-magazine",
];

fn template_set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// Entitlements for every tier.
///
/// # Default Configuration
///
/// | Tier | Daily | HD | 4K | Watermark | Templates |
/// |------|-------|----|----|-----------|-----------|
/// | Free | 3 | No | No | Yes | 3 |
/// | Starter | 30 | Yes | No | No | 6 |
/// | Pro | Unlimited | Yes | Yes | No | All |
/// | Agency | Unlimited | Yes | Yes | No | All |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitlementTable {
    pub free: Entitlements,
    pub starter: Entitlements,
    pub pro: Entitlements,
    pub agency: Entitlements,
}

impl EntitlementTable {
    /// Get the entitlements for a specific tier.
    pub fn resolve(&self, tier: PlanTier) -> &Entitlements {
        match tier {
            PlanTier::Free => &self.free,
            PlanTier::Starter => &self.starter,
            PlanTier::Pro => &self.pro,
            PlanTier::Agency => &self.agency,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for tier in PlanTier::ALL {
            self.resolve(tier).validate(tier)?;
        }
        Ok(())
    }
}

impl Default for EntitlementTable {
    fn default() -> Self {
        Self {
            free: Entitlements {
                max_daily_generations: DailyQuota::Limited(3),
                allow_hd_export: false,
                allow_4k_export: false,
                watermark_required: true,
                allowed_template_ids: template_set(FREE_TEMPLATES),
            },
            starter: Entitlements {
                max_daily_generations: DailyQuota::Limited(30),
                allow_hd_export: true,
                allow_4k_export: false,
                watermark_required: false,
                allowed_template_ids: template_set(STARTER_TEMPLATES),
            },
            pro: Entitlements {
                max_daily_generations: DailyQuota::Unlimited,
                allow_hd_export: true,
                allow_4k_export: true,
                watermark_required: false,
                allowed_template_ids: template_set(ALL_TEMPLATES),
            },
            agency: Entitlements {
                max_daily_generations: DailyQuota::Unlimited,
                allow_hd_export: true,
                allow_4k_export: true,
                watermark_required: false,
                allowed_template_ids: template_set(ALL_TEMPLATES),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Default table

    #[test]
    fn free_tier_has_3_daily_mockups() {
        let table = EntitlementTable::default();
        assert_eq!(
            table.resolve(PlanTier::Free).max_daily_generations,
            DailyQuota::Limited(3)
        );
    }

    #[test]
    fn free_tier_is_watermarked_and_sd_only() {
        let table = EntitlementTable::default();
        let free = table.resolve(PlanTier::Free);
        assert!(free.watermark_required);
        assert!(!free.allow_hd_export);
        assert!(!free.allow_4k_export);
        assert!(free.allows_quality(ExportQuality::Sd720));
    }

    #[test]
    fn starter_tier_has_hd_but_not_4k() {
        let table = EntitlementTable::default();
        let starter = table.resolve(PlanTier::Starter);
        assert_eq!(starter.max_daily_generations, DailyQuota::Limited(30));
        assert!(starter.allows_quality(ExportQuality::Hd1080));
        assert!(!starter.allows_quality(ExportQuality::Uhd4k));
    }

    #[test]
    fn pro_and_agency_are_unlimited() {
        let table = EntitlementTable::default();
        assert!(table.resolve(PlanTier::Pro).max_daily_generations.is_unlimited());
        assert!(table.resolve(PlanTier::Agency).max_daily_generations.is_unlimited());
    }

    #[test]
    fn template_allowlists_grow_with_tier() {
        let table = EntitlementTable::default();
        let counts: Vec<usize> = PlanTier::ALL
            .iter()
            .map(|t| table.resolve(*t).allowed_template_ids.len())
            .collect();
        assert_eq!(counts, vec![3, 6, 10, 10]);
    }

    #[test]
    fn unknown_template_is_not_allowed_on_any_tier() {
        let table = EntitlementTable::default();
        for tier in PlanTier::ALL {
            assert!(!table.resolve(tier).allows_template("does-not-exist"));
        }
    }

    #[test]
    fn sd_is_always_allowed() {
        let table = EntitlementTable::default();
        for tier in PlanTier::ALL {
            assert!(table.resolve(tier).allows_quality(ExportQuality::Sd720));
        }
    }

    #[test]
    fn resolve_is_deterministic() {
        let table = EntitlementTable::default();
        for tier in PlanTier::ALL {
            assert_eq!(table.resolve(tier), table.resolve(tier));
        }
    }

    // DailyQuota

    #[test]
    fn unlimited_quota_never_reaches_limit() {
        assert!(!DailyQuota::Unlimited.limit_reached(u32::MAX));
        assert!(!DailyQuota::Unlimited.is_last_unit(0));
    }

    #[test]
    fn limited_quota_reports_last_unit_and_exhaustion() {
        let quota = DailyQuota::Limited(3);
        assert!(!quota.is_last_unit(1));
        assert!(quota.is_last_unit(2));
        assert!(!quota.limit_reached(2));
        assert!(quota.limit_reached(3));
        assert!(quota.limit_reached(4));
    }

    #[test]
    fn zero_quota_has_no_last_unit() {
        let quota = DailyQuota::Limited(0);
        assert!(!quota.is_last_unit(0));
        assert!(quota.limit_reached(0));
    }

    #[test]
    fn quota_deserializes_from_count_keyword_and_numeric_string() {
        let n: DailyQuota = serde_json::from_str("5").unwrap();
        assert_eq!(n, DailyQuota::Limited(5));

        let u: DailyQuota = serde_json::from_str("\"unlimited\"").unwrap();
        assert_eq!(u, DailyQuota::Unlimited);

        let s: DailyQuota = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(s, DailyQuota::Limited(12));

        let bad: Result<DailyQuota, _> = serde_json::from_str("\"lots\"");
        assert!(bad.is_err());
    }

    #[test]
    fn quota_serializes_unlimited_as_keyword() {
        assert_eq!(
            serde_json::to_string(&DailyQuota::Unlimited).unwrap(),
            "\"unlimited\""
        );
        assert_eq!(serde_json::to_string(&DailyQuota::Limited(3)).unwrap(), "3");
    }

    // Overrides

    #[test]
    fn partial_table_override_keeps_other_defaults() {
        let yaml = r#"
starter:
  max_daily_generations: 50
  allow_hd_export: true
  allow_4k_export: false
  watermark_required: false
  allowed_template_ids: [billboard-nyc]
"#;
        let table: EntitlementTable = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            table.resolve(PlanTier::Starter).max_daily_generations,
            DailyQuota::Limited(50)
        );
        assert_eq!(table.free, EntitlementTable::default().free);
    }

    #[test]
    fn blank_template_id_fails_validation() {
        let mut table = EntitlementTable::default();
        table.pro.allowed_template_ids.insert("  ".to_string());
        assert!(table.validate().is_err());
        assert!(EntitlementTable::default().validate().is_ok());
    }
}
