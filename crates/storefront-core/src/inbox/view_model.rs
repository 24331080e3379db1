//! Inbox screen state.

use chrono::{DateTime, Local, TimeZone};
use tokio::sync::broadcast::{self, error::RecvError};

use super::{InboxItem, InboxSection, create_sections_at};
use crate::events::AppEvent;

/// Sections shown on the inbox screen.
///
/// Sections are recomputed in full whenever the inbox changes.
#[derive(Debug, Clone, Default)]
pub struct InboxViewModel {
    sections: Vec<InboxSection>,
}

impl InboxViewModel {
    /// Creates the view state for the given items.
    #[must_use]
    pub fn new(items: &[InboxItem]) -> Self {
        let mut model = Self::default();
        model.refresh(items, &Local::now());
        model
    }

    /// Current sections.
    #[must_use]
    pub fn sections(&self) -> &[InboxSection] {
        &self.sections
    }

    /// Whether there is nothing to show.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Re-sections `items` relative to `now`.
    pub fn refresh<Tz: TimeZone>(&mut self, items: &[InboxItem], now: &DateTime<Tz>) {
        self.sections = create_sections_at(items, now);
    }

    /// Applies an event. Returns true if the sections changed.
    pub fn handle_event(&mut self, event: &AppEvent) -> bool {
        self.handle_event_at(event, &Local::now())
    }

    /// Applies an event relative to `now`. Returns true if the sections changed.
    pub fn handle_event_at<Tz: TimeZone>(&mut self, event: &AppEvent, now: &DateTime<Tz>) -> bool {
        match event {
            AppEvent::InboxUpdated(items) => {
                self.refresh(items, now);
                true
            }
            AppEvent::Launched
            | AppEvent::NotificationSettingsChanged
            | AppEvent::BadgeUpdated(_)
            | AppEvent::BeaconsRanged(_) => false,
        }
    }

    /// Consumes events until the bus closes.
    ///
    /// A lagged receiver skips the missed events; the next `InboxUpdated`
    /// carries the full item list, so nothing is lost.
    pub async fn run(&mut self, mut events: broadcast::Receiver<AppEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    self.handle_event(&event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Inbox view lagged behind by {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
