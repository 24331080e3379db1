//! # storefront-core
//!
//! Core logic for the storefront demo app.
//!
//! This crate provides:
//! - Inbox model and store mirroring the messaging SDK's inbox
//! - **Inbox Sections** - Today / Yesterday / Last 7 days / per-month grouping
//! - Process-wide event broadcasts consumed by view state
//! - **Location Permissions** - permission state machine driving location updates
//! - Application configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod events;
pub mod inbox;
pub mod location;

pub use config::{AppConfig, Environment, LocationConfig};
pub use error::{Error, Result};
pub use events::{AppEvent, EventBus};
pub use inbox::{
    InboxItem, InboxItemId, InboxSection, InboxStore, InboxViewModel, NotificationPayload,
    SectionGroup, create_sections, create_sections_at,
};
pub use location::{
    AlwaysPermissionFlag, AuthorizationStatus, InMemoryLocationServices, LocationController,
    LocationFix, LocationServices, LocationToggle, PermissionPlatform, RequestResult,
    SimulatedPlatform,
};
