//! Notification sinks.
//!
//! - `TracingNotificationSink` - Writes signals to the log
//! - `CollectingNotificationSink` - Keeps signals in memory for assertions

use std::sync::{Arc, Mutex};

use crate::domain::paywall::{Severity, Signal};
use crate::ports::NotificationSink;

/// Logs each signal at a level matching its severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, signal: &Signal) {
        match signal.severity {
            Severity::Warning => tracing::warn!(signal = %signal.message, "Usage warning"),
            Severity::Celebration => tracing::info!(signal = %signal.message, "Milestone reached"),
            Severity::Info => tracing::info!(signal = %signal.message, "Notice"),
        }
    }
}

/// Records every signal it receives. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CollectingNotificationSink {
    received: Arc<Mutex<Vec<Signal>>>,
}

impl CollectingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<Signal> {
        self.received
            .lock()
            .map(|signals| signals.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.received()
            .iter()
            .filter(|s| s.severity == severity)
            .count()
    }
}

impl NotificationSink for CollectingNotificationSink {
    fn notify(&self, signal: &Signal) {
        if let Ok(mut signals) = self.received.lock() {
            signals.push(signal.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_keeps_order() {
        let sink = CollectingNotificationSink::new();
        sink.notify_all(&[Signal::last_free_unit(), Signal::info("saved")]);

        let received = sink.received();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].severity, Severity::Warning);
        assert_eq!(sink.count(Severity::Info), 1);
    }

    #[test]
    fn clones_share_buffer() {
        let sink = CollectingNotificationSink::new();
        let handle = sink.clone();
        sink.notify(&Signal::celebration("first"));
        assert_eq!(handle.received().len(), 1);
    }

    #[test]
    fn tracing_sink_accepts_every_severity() {
        let sink = TracingNotificationSink;
        sink.notify_all(&[
            Signal::info("a"),
            Signal::celebration("b"),
            Signal::warning("c"),
        ]);
    }
}
