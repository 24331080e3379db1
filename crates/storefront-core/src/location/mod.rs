//! Location permissions.
//!
//! [`LocationController`] wraps the platform permission API, turns its
//! authorization states into a uniform [`RequestResult`], and switches the
//! SDK's location updates on or off as permissions change.

mod controller;
mod platform;
mod status;
mod toggle;

pub use controller::{AlwaysPermissionFlag, LocationController};
pub use platform::{
    InMemoryLocationServices, LocationFix, LocationServices, PermissionPlatform, SimulatedPlatform,
};
pub use status::{AuthorizationStatus, RequestResult};
pub use toggle::LocationToggle;
