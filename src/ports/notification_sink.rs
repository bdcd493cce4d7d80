//! Notification sink port - where advisory signals end up.
//!
//! Rendering (toasts, banners, logs) is entirely the sink's concern.

use crate::domain::paywall::Signal;

pub trait NotificationSink: Send + Sync {
    fn notify(&self, signal: &Signal);

    fn notify_all(&self, signals: &[Signal]) {
        for signal in signals {
            self.notify(signal);
        }
    }
}
