//! User-facing notifications
//!
//! The session never talks to a UI directly. Hosts pass a [`Notifier`]; when
//! there is none, [`TracingNotifier`] sends the messages to the log.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warn,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Warn => write!(f, "warn"),
        }
    }
}

/// Receiver for short status messages ("Loaded notes.md", "Nothing to export").
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Writes notifications as log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Warn => tracing::warn!(%severity, "{message}"),
            Severity::Info | Severity::Success => tracing::info!(%severity, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn forwards_messages_to_the_log() {
        TracingNotifier.notify("Nothing to export", Severity::Warn);
        TracingNotifier.notify("Exported notes.md", Severity::Success);
        assert!(logs_contain("Nothing to export"));
        assert!(logs_contain("severity=success"));
    }
}
