//! Application handlers.
//!
//! Command handlers that orchestrate domain operations over the ports.

pub mod mockup;
pub mod paywall;

pub use mockup::{
    ExportMockupCommand, ExportMockupHandler, ExportMockupOutcome, ExportPlan,
    GenerateMockupCommand, GenerateMockupHandler, GenerateMockupOutcome, GeneratedMockup,
    MockupError, Upload,
};
pub use paywall::{
    ApplyPlanChangeCommand, ApplyPlanChangeHandler, ApplyPlanChangeResult, DeviceState,
    GuardActionCommand, GuardActionHandler, PlanFulfilment, PlanSelectionConfig,
    PlanSelectionError, RecordGenerationHandler, RecordGenerationResult, SelectPlanCommand,
    SelectPlanHandler, SelectPlanOutcome, DEFAULT_TRIAL_DAYS,
};
