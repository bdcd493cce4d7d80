//! Advisory signals routed to a notification sink.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Celebration,
    Warning,
}

/// A non-blocking notice produced alongside a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub severity: Severity,
    pub message: String,
}

impl Signal {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn celebration(message: impl Into<String>) -> Self {
        Self::new(Severity::Celebration, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn last_free_unit() -> Self {
        Self::warning("Last free mockup remaining today!")
    }

    /// Celebration for lifetime milestones (1st and 10th mockup).
    pub fn milestone(lifetime_count: u64) -> Option<Self> {
        match lifetime_count {
            1 => Some(Self::celebration("Your first mockup looks amazing!")),
            10 => Some(Self::celebration("10 mockups created! You're a natural.")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestones_fire_on_first_and_tenth_only() {
        assert!(Signal::milestone(1).is_some());
        assert!(Signal::milestone(10).is_some());
        assert!(Signal::milestone(2).is_none());
        assert!(Signal::milestone(11).is_none());
        assert_eq!(Signal::milestone(1).unwrap().severity, Severity::Celebration);
    }

    #[test]
    fn last_free_unit_is_a_warning() {
        assert_eq!(Signal::last_free_unit().severity, Severity::Warning);
    }
}
