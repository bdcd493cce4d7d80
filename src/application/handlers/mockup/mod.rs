//! Mockup handlers.
//!
//! - `GenerateMockupHandler` - Validate, guard, count, generate
//! - `ExportMockupHandler` - Guard an export and plan the file

mod errors;
mod export_mockup;
mod generate_mockup;

pub use errors::MockupError;
pub use export_mockup::{ExportMockupCommand, ExportMockupHandler, ExportMockupOutcome, ExportPlan};
pub use generate_mockup::{
    GenerateMockupCommand, GenerateMockupHandler, GenerateMockupOutcome, GeneratedMockup, Upload,
};
