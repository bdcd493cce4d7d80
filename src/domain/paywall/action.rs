//! User actions the evaluator decides on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::plan::ExportQuality;

/// A gated user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UserAction {
    Generate,
    Export { quality: ExportQuality },
    SelectTemplate { template_id: String },
    TrackTime { time_spent_secs: u64, edit_count: u32 },
}

/// Ambient inputs for an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionContext {
    pub now: Timestamp,
}

impl ActionContext {
    pub fn at(now: Timestamp) -> Self {
        Self { now }
    }

    pub fn now() -> Self {
        Self::at(Timestamp::now())
    }

    /// Date the daily window is reconciled against.
    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }
}
