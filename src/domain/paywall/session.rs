//! Paywall session - the ephemeral open/closed prompt state.
//!
//! Not persisted. One session exists per active device.

use serde::{Deserialize, Serialize};

use super::{Evaluation, PaywallError, PaywallMessage, PaywallTrigger};
use crate::domain::foundation::StateMachine;

/// Phase of a paywall session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaywallPhase {
    Closed,
    Open,
}

impl PaywallPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaywallPhase::Closed => "closed",
            PaywallPhase::Open => "open",
        }
    }
}

impl StateMachine for PaywallPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaywallPhase::*;
        matches!(
            (self, target),
            (Closed, Open) | (Open, Open) | (Open, Closed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaywallPhase::*;
        match self {
            Closed => vec![Open],
            Open => vec![Open, Closed],
        }
    }
}

/// The trigger and message an open session is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePaywall {
    pub trigger: PaywallTrigger,
    pub message: PaywallMessage,
}

/// Paywall session state.
///
/// # Invariants
///
/// - Open exactly when a trigger and message are held
/// - Reopening while open replaces the payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaywallSession {
    active: Option<ActivePaywall>,
}

/// Serializable view handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaywallSessionView {
    pub is_open: bool,
    pub active_trigger: Option<PaywallTrigger>,
    pub message: Option<PaywallMessage>,
}

impl PaywallSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PaywallPhase {
        if self.active.is_some() {
            PaywallPhase::Open
        } else {
            PaywallPhase::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActivePaywall> {
        self.active.as_ref()
    }

    pub fn active_trigger(&self) -> Option<&PaywallTrigger> {
        self.active.as_ref().map(|a| &a.trigger)
    }

    pub fn message(&self) -> Option<&PaywallMessage> {
        self.active.as_ref().map(|a| &a.message)
    }

    /// Show a paywall, replacing any payload already showing.
    pub fn open(&mut self, trigger: PaywallTrigger, message: PaywallMessage) {
        // Closed -> Open and Open -> Open are both legal.
        debug_assert!(self.phase().can_transition_to(&PaywallPhase::Open));
        self.active = Some(ActivePaywall { trigger, message });
    }

    /// Open the session if the evaluation blocked. Returns true when opened.
    pub fn apply(&mut self, evaluation: &Evaluation) -> bool {
        match evaluation {
            Evaluation::Block { trigger, message } => {
                self.open(trigger.clone(), message.clone());
                true
            }
            Evaluation::Proceed { .. } => false,
        }
    }

    /// Close on user dismissal. Dismissing a closed session does nothing.
    pub fn dismiss(&mut self) {
        self.active = None;
    }

    /// Close after a plan was chosen. Only valid while open.
    ///
    /// Returns the payload that was showing.
    pub fn close_for_selection(&mut self) -> Result<ActivePaywall, PaywallError> {
        self.phase()
            .transition_to(PaywallPhase::Closed)
            .map_err(|_| PaywallError::invalid_state(self.phase().as_str(), "select a plan on"))?;
        self.active
            .take()
            .ok_or_else(|| PaywallError::invalid_state("closed", "select a plan on"))
    }

    /// Fail unless the session is open.
    pub fn ensure_open(&self) -> Result<&ActivePaywall, PaywallError> {
        self.active
            .as_ref()
            .ok_or_else(|| PaywallError::invalid_state("closed", "select a plan on"))
    }

    pub fn view(&self) -> PaywallSessionView {
        PaywallSessionView {
            is_open: self.is_open(),
            active_trigger: self.active_trigger().cloned(),
            message: self.message().cloned(),
        }
    }
}
