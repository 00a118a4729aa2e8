//! User-facing notifications published on the event bus.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
    Success,
}

impl AlertSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Error => "error",
            AlertSeverity::Success => "success",
        }
    }
}

/// A single toast notification. Created when something noteworthy happens
/// and handed to whoever listens on the alert channel; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub title: Option<String>,
    pub text: Option<String>,
    pub severity: AlertSeverity,
}

impl AlertMessage {
    pub fn new(title: Option<String>, text: Option<String>, severity: AlertSeverity) -> Self {
        Self {
            title,
            text,
            severity,
        }
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Some(title.into()), Some(text.into()), AlertSeverity::Error)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(Some(title.into()), None, AlertSeverity::Warning)
    }
}
