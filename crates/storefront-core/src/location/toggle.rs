//! The "location" switch on the settings screen.

use std::sync::Arc;

use super::{LocationController, LocationServices, PermissionPlatform, RequestResult};

/// State of the location switch bound to a [`LocationController`].
pub struct LocationToggle<P, S> {
    controller: Arc<LocationController<P, S>>,
    enabled: bool,
    showing_settings_permission_dialog: bool,
}

impl<P, S> LocationToggle<P, S>
where
    P: PermissionPlatform + 'static,
    S: LocationServices + 'static,
{
    /// Creates the switch, reflecting the controller's current capabilities.
    pub async fn new(controller: Arc<LocationController<P, S>>) -> Self {
        let enabled = controller.has_location_tracking_capabilities().await;
        Self {
            controller,
            enabled,
            showing_settings_permission_dialog: false,
        }
    }

    /// Whether the switch is on.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the "open settings" dialog should be shown.
    #[must_use]
    pub const fn showing_settings_permission_dialog(&self) -> bool {
        self.showing_settings_permission_dialog
    }

    /// Dismisses the "open settings" dialog.
    pub const fn dismiss_settings_permission_dialog(&mut self) {
        self.showing_settings_permission_dialog = false;
    }

    /// Handles the user flipping the switch.
    ///
    /// Turning it off stops location updates. Turning it on requests
    /// permissions and returns the outcome; the switch itself is corrected by
    /// [`refresh`](Self::refresh) once capabilities change.
    pub async fn set_enabled(&mut self, enabled: bool) -> Option<RequestResult> {
        self.enabled = enabled;

        if !enabled {
            self.controller.disable_location_updates().await;
            return None;
        }

        let result = self.controller.request_permissions().await;
        if result == RequestResult::RequiresChangeInSettings {
            self.showing_settings_permission_dialog = true;
        }
        Some(result)
    }

    /// Re-reads the controller's capabilities.
    pub async fn refresh(&mut self) {
        self.enabled = self.controller.has_location_tracking_capabilities().await;
    }
}
