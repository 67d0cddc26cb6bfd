//! User-facing notices
//!
//! Alerts shown to the user in response to an explicit action: a denied
//! permission prompt, a failed search, an auth result. Background work never
//! raises notices.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// An alert with a title and a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Alert title
    pub title: String,
    /// Alert body
    pub message: String,
}

impl Notice {
    /// Create a notice
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Location permission was denied
    pub fn permission_denied() -> Self {
        Self::new(
            "Permission Denied",
            "Location permission is required for navigation.",
        )
    }

    /// A search matched nothing
    pub fn not_found() -> Self {
        Self::new("Not Found", "Location not found.")
    }

    /// A search failed in transport or parsing
    pub fn search_failed() -> Self {
        Self::new("Error", "Search failed.")
    }

    /// Sign-up needs email confirmation
    pub fn confirm_email() -> Self {
        Self::new("Success", "Check your email for confirmation!")
    }

    /// Generic error with a service-provided message
    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Broadcasts notices to whatever presents them
#[derive(Debug, Clone)]
pub struct NoticeCenter {
    tx: broadcast::Sender<Notice>,
}

impl NoticeCenter {
    /// Create a notice center
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Show a notice
    pub fn post(&self, notice: Notice) {
        tracing::info!(title = %notice.title, message = %notice.message, "notice");
        let _ = self.tx.send(notice);
    }

    /// Subscribe to notices
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl Default for NoticeCenter {
    fn default() -> Self {
        Self::new()
    }
}
