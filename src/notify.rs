//! Local notification delivery
//!
//! Notifications are fire-and-forget: callers log a failed dispatch and
//! carry on.

use colored::Colorize;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::error::NotifyError;

/// Immediate local notification sink
pub trait Notifier: Send {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Emits notifications as tracing events
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        info!(title, body, "Notification");
        Ok(())
    }
}

/// Prints notifications to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        println!("{} {}", "🔔".bold(), title.bold().cyan());
        println!("   {}", body);
        Ok(())
    }
}

/// A delivered notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Records notifications in memory. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .map_err(|e| NotifyError::DispatchFailed(e.to_string()))?
            .push(Notification {
                title: title.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        let view = notifier.clone();
        notifier.notify("a", "first").unwrap();
        notifier.notify("b", "second").unwrap();

        let sent = view.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].title, "a");
        assert_eq!(sent[1].body, "second");
    }
}
