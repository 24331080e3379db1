//! In-app inbox.
//!
//! Mirrors the messaging SDK's inbox, applies the mutations the app drives
//! (mark as read, remove, clear) and groups items into dated sections for
//! display.

mod model;
mod section;
mod store;
mod view_model;

pub use model::{InboxItem, InboxItemId, NotificationPayload};
pub use section::{InboxSection, SectionGroup, create_sections, create_sections_at};
pub use store::InboxStore;
pub use view_model::InboxViewModel;
