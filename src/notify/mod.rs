//! Notification sink — fire-and-forget user-facing messages.
//!
//! The cart engine publishes success/warning/error notices through this
//! seam and never depends on delivery succeeding. The shipped
//! implementation writes structured tracing events; a UI shell can swap
//! in a toast renderer behind the same trait.

use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notification {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

// ---------------------------------------------------------------------------
// Sink trait & implementations
// ---------------------------------------------------------------------------

/// Abstraction over the notification channel.
///
/// `publish` must not block and must not fail visibly: delivery is
/// best-effort by contract.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn publish(&self, note: Notification);
}

/// Sink that writes notifications as structured log events.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn publish(&self, note: Notification) {
        match note.severity {
            Severity::Success => info!(message = %note.message, "notification"),
            Severity::Warning => warn!(message = %note.message, "notification"),
            Severity::Error => error!(message = %note.message, "notification"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
