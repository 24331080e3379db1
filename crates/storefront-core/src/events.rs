//! Process-wide event broadcasts.
//!
//! SDK delegate callbacks are forwarded onto the [`EventBus`], and view
//! state subscribes to the events it cares about.

use tokio::sync::broadcast;

use crate::inbox::InboxItem;

/// Default capacity of the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// An application-wide event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The SDK finished launching and is ready for use.
    Launched,
    /// The user's notification settings changed.
    NotificationSettingsChanged,
    /// The inbox contents changed. Carries the full, current item list.
    InboxUpdated(Vec<InboxItem>),
    /// The number of unread inbox items changed.
    BadgeUpdated(usize),
    /// Beacons were ranged in a region. Carries the beacon identifiers.
    BeaconsRanged(Vec<String>),
}

impl AppEvent {
    /// Short name of the event, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Launched => "launched",
            Self::NotificationSettingsChanged => "notification_settings_changed",
            Self::InboxUpdated(_) => "inbox_updated",
            Self::BadgeUpdated(_) => "badge_updated",
            Self::BeaconsRanged(_) => "beacons_ranged",
        }
    }
}

/// Broadcast channel shared by everything that produces or consumes
/// [`AppEvent`]s.
///
/// Cloning the bus yields another handle to the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a bus that buffers up to `capacity` events per receiver.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to every current subscriber.
    ///
    /// Publishing with no subscribers is not an error; the event is dropped.
    pub fn publish(&self, event: AppEvent) {
        let name = event.name();
        if let Ok(receivers) = self.sender.send(event) {
            tracing::debug!("Published {} to {} receivers", name, receivers);
        } else {
            tracing::trace!("Dropped {}: no subscribers", name);
        }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
