//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::stripe::PriceTable;
use crate::domain::plan::{BillingPeriod, PlanTier};
use crate::domain::usage::MAX_TRIAL_DAYS;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key
    pub stripe_api_key: String,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,

    pub starter_monthly_price_id: Option<String>,
    pub starter_yearly_price_id: Option<String>,
    pub pro_monthly_price_id: Option<String>,
    pub pro_yearly_price_id: Option<String>,

    /// Agency is sold through sales, but its prices let subscription lookups
    /// recognise agency customers.
    pub agency_monthly_price_id: Option<String>,
    pub agency_yearly_price_id: Option<String>,

    /// Coupon applied to every checkout (launch pricing)
    pub launch_coupon: Option<String>,

    /// Trial days added to checkouts that do not ask for a specific length
    #[serde(default = "default_checkout_trial_days")]
    pub checkout_trial_days: u32,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    /// Launch coupon, if one is set and non-blank
    pub fn launch_coupon(&self) -> Option<String> {
        self.launch_coupon
            .as_ref()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    }

    fn prices(&self) -> [(PlanTier, BillingPeriod, &'static str, &Option<String>); 6] {
        [
            (PlanTier::Starter, BillingPeriod::Monthly, "starter_monthly", &self.starter_monthly_price_id),
            (PlanTier::Starter, BillingPeriod::Yearly, "starter_yearly", &self.starter_yearly_price_id),
            (PlanTier::Pro, BillingPeriod::Monthly, "pro_monthly", &self.pro_monthly_price_id),
            (PlanTier::Pro, BillingPeriod::Yearly, "pro_yearly", &self.pro_yearly_price_id),
            (PlanTier::Agency, BillingPeriod::Monthly, "agency_monthly", &self.agency_monthly_price_id),
            (PlanTier::Agency, BillingPeriod::Yearly, "agency_yearly", &self.agency_yearly_price_id),
        ]
    }

    /// Build the Stripe price table from the configured price ids
    pub fn price_table(&self) -> PriceTable {
        self.prices()
            .into_iter()
            .fold(PriceTable::new(), |table, (tier, period, _, id)| match id {
                Some(id) => table.with_price(tier, period, id.trim()),
                None => table,
            })
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        for (_, _, name, id) in self.prices() {
            if let Some(id) = id {
                let id = id.trim();
                if !id.is_empty() && !id.starts_with("price_") {
                    return Err(ValidationError::InvalidPriceId(name));
                }
            }
        }

        if self.checkout_trial_days > MAX_TRIAL_DAYS {
            return Err(ValidationError::InvalidTrialLength);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            starter_monthly_price_id: None,
            starter_yearly_price_id: None,
            pro_monthly_price_id: None,
            pro_yearly_price_id: None,
            agency_monthly_price_id: None,
            agency_yearly_price_id: None,
            launch_coupon: None,
            checkout_trial_days: default_checkout_trial_days(),
        }
    }
}

fn default_checkout_trial_days() -> u32 {
    7
}
