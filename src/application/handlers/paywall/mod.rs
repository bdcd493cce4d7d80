//! Paywall handlers.
//!
//! - `GuardActionHandler` - Evaluate an action, open the paywall on block
//! - `RecordGenerationHandler` - Persist-then-commit usage bookkeeping
//! - `SelectPlanHandler` - Resolve an open paywall (trial, checkout, sales)
//! - `ApplyPlanChangeHandler` - Apply a plan confirmed by billing

mod apply_plan_change;
mod device_state;
mod guard_action;
mod record_generation;
mod select_plan;

pub use apply_plan_change::{
    ApplyPlanChangeCommand, ApplyPlanChangeHandler, ApplyPlanChangeResult,
};
pub use device_state::DeviceState;
pub use guard_action::{GuardActionCommand, GuardActionHandler};
pub use record_generation::{RecordGenerationHandler, RecordGenerationResult};
pub use select_plan::{
    PlanFulfilment, PlanSelectionConfig, PlanSelectionError, SelectPlanCommand,
    SelectPlanHandler, SelectPlanOutcome, DEFAULT_TRIAL_DAYS,
};
