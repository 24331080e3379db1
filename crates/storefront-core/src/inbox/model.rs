//! Inbox data models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification type used for deep-link notifications.
pub const URL_SCHEME_TYPE: &str = "re.notifica.notification.URLScheme";

/// Unique identifier of an inbox item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InboxItemId(pub String);

impl InboxItemId {
    /// Creates an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InboxItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The notification carried by an inbox item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Notification identifier.
    pub id: String,
    /// Notification type, e.g. `re.notifica.notification.Alert`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional title.
    #[serde(default)]
    pub title: Option<String>,
    /// Message body.
    pub message: String,
}

impl NotificationPayload {
    /// Whether opening this notification navigates to a deep link.
    #[must_use]
    pub fn is_deep_link(&self) -> bool {
        self.kind == URL_SCHEME_TYPE
    }

    /// Title to show in lists, falling back to the message.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.message)
    }
}

/// A single inbox entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxItem {
    /// Unique identifier.
    pub id: InboxItemId,
    /// When the item was received.
    pub received_at: DateTime<Utc>,
    /// Whether the item has been opened (read).
    #[serde(default)]
    pub opened: bool,
    /// The notification payload.
    pub notification: NotificationPayload,
    /// When the item stops being shown, if ever.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl InboxItem {
    /// Creates an unopened, non-expiring item.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        received_at: DateTime<Utc>,
        notification: NotificationPayload,
    ) -> Self {
        Self {
            id: InboxItemId::new(id),
            received_at,
            opened: false,
            notification,
            expires_at: None,
        }
    }

    /// Returns true if the item has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}
