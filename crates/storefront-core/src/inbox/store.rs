//! Local mirror of the messaging SDK's inbox.

use chrono::Utc;

use super::{InboxItem, InboxItemId};
use crate::events::{AppEvent, EventBus};
use crate::{Error, Result};

/// Holds the inbox items and applies the mutations the app drives.
///
/// Items are kept newest first. Every successful mutation publishes
/// [`AppEvent::InboxUpdated`] and [`AppEvent::BadgeUpdated`] on the bus.
#[derive(Debug)]
pub struct InboxStore {
    items: Vec<InboxItem>,
    events: EventBus,
}

impl InboxStore {
    /// Creates an empty store publishing on `events`.
    #[must_use]
    pub const fn new(events: EventBus) -> Self {
        Self {
            items: Vec::new(),
            events,
        }
    }

    /// Non-expired items, newest first.
    #[must_use]
    pub fn items(&self) -> Vec<InboxItem> {
        let now = Utc::now();
        self.items
            .iter()
            .filter(|item| !item.is_expired_at(now))
            .cloned()
            .collect()
    }

    /// Number of unopened, non-expired items.
    #[must_use]
    pub fn badge(&self) -> usize {
        let now = Utc::now();
        self.items
            .iter()
            .filter(|item| !item.opened && !item.is_expired_at(now))
            .count()
    }

    /// Adds an item, replacing any existing item with the same id.
    pub fn insert(&mut self, item: InboxItem) {
        self.items.retain(|existing| existing.id != item.id);

        let position = self
            .items
            .iter()
            .position(|existing| existing.received_at < item.received_at)
            .unwrap_or(self.items.len());
        self.items.insert(position, item);

        self.notify();
    }

    /// Marks a single item as read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ItemNotFound`] if no item has this id.
    pub fn mark_as_read(&mut self, id: &InboxItemId) -> Result<()> {
        let item = self
            .items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| Error::ItemNotFound(id.clone()))?;

        item.opened = true;
        tracing::debug!("Marked inbox item {} as read", id);

        self.notify();
        Ok(())
    }

    /// Marks every item as read.
    pub fn mark_all_as_read(&mut self) {
        for item in &mut self.items {
            item.opened = true;
        }
        tracing::debug!("Marked all {} inbox items as read", self.items.len());

        self.notify();
    }

    /// Removes a single item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ItemNotFound`] if no item has this id.
    pub fn remove(&mut self, id: &InboxItemId) -> Result<()> {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);

        if self.items.len() == before {
            return Err(Error::ItemNotFound(id.clone()));
        }
        tracing::debug!("Removed inbox item {}", id);

        self.notify();
        Ok(())
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.items.clear();
        tracing::debug!("Cleared inbox");

        self.notify();
    }

    fn notify(&self) {
        self.events.publish(AppEvent::InboxUpdated(self.items()));
        self.events.publish(AppEvent::BadgeUpdated(self.badge()));
    }
}
