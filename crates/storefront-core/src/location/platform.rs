//! Platform and SDK collaborators of the location controller.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::AuthorizationStatus;

/// The operating system's location permission API.
///
/// Requests are fire-and-forget: their outcome is delivered later as an
/// authorization change.
pub trait PermissionPlatform: Send + Sync {
    /// Current authorization status.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Shows the "while using the app" permission prompt.
    fn request_when_in_use_authorization(&self);

    /// Shows the "always" permission prompt.
    fn request_always_authorization(&self);
}

/// The SDK capability that collects location updates.
#[async_trait]
pub trait LocationServices: Send + Sync {
    /// Whether location updates are currently enabled.
    async fn has_location_services_enabled(&self) -> bool;

    /// Starts collecting location updates.
    async fn enable_location_updates(&self);

    /// Stops collecting location updates and clears the last known location.
    async fn disable_location_updates(&self);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scripted permission platform.
///
/// Each prompt resolves to a preset decision and the resulting status change
/// is published to subscribers. A `None` decision leaves the prompt open.
#[derive(Debug)]
pub struct SimulatedPlatform {
    status: Mutex<AuthorizationStatus>,
    when_in_use_decision: Mutex<Option<AuthorizationStatus>>,
    always_decision: Mutex<Option<AuthorizationStatus>>,
    when_in_use_requests: AtomicUsize,
    always_requests: AtomicUsize,
    changes: broadcast::Sender<AuthorizationStatus>,
}

impl SimulatedPlatform {
    /// Creates a platform in `status` whose prompts are granted.
    #[must_use]
    pub fn new(status: AuthorizationStatus) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            status: Mutex::new(status),
            when_in_use_decision: Mutex::new(Some(AuthorizationStatus::AuthorizedWhenInUse)),
            always_decision: Mutex::new(Some(AuthorizationStatus::AuthorizedAlways)),
            when_in_use_requests: AtomicUsize::new(0),
            always_requests: AtomicUsize::new(0),
            changes,
        }
    }

    /// Sets how the next "while using the app" prompt is answered.
    pub fn set_when_in_use_decision(&self, decision: Option<AuthorizationStatus>) {
        *lock(&self.when_in_use_decision) = decision;
    }

    /// Sets how the next "always" prompt is answered.
    pub fn set_always_decision(&self, decision: Option<AuthorizationStatus>) {
        *lock(&self.always_decision) = decision;
    }

    /// Subscribes to authorization changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthorizationStatus> {
        self.changes.subscribe()
    }

    /// Changes the status as if the user edited it in the system settings.
    pub fn set_status(&self, status: AuthorizationStatus) {
        let changed = {
            let mut current = lock(&self.status);
            let changed = *current != status;
            *current = status;
            changed
        };

        if changed {
            self.publish(status);
        }
    }

    /// Publishes the current status without changing it, like the callback
    /// the platform fires when a location manager is created.
    pub fn announce_current_status(&self) {
        self.publish(self.authorization_status());
    }

    /// Number of "while using the app" prompts shown.
    #[must_use]
    pub fn when_in_use_requests(&self) -> usize {
        self.when_in_use_requests.load(Ordering::SeqCst)
    }

    /// Number of "always" prompts shown.
    #[must_use]
    pub fn always_requests(&self) -> usize {
        self.always_requests.load(Ordering::SeqCst)
    }

    fn publish(&self, status: AuthorizationStatus) {
        if self.changes.send(status).is_err() {
            tracing::trace!("No listeners for authorization change to {}", status);
        }
    }
}

impl PermissionPlatform for SimulatedPlatform {
    fn authorization_status(&self) -> AuthorizationStatus {
        *lock(&self.status)
    }

    fn request_when_in_use_authorization(&self) {
        self.when_in_use_requests.fetch_add(1, Ordering::SeqCst);
        let decision = *lock(&self.when_in_use_decision);
        if let Some(decision) = decision {
            self.set_status(decision);
        }
    }

    fn request_always_authorization(&self) {
        self.always_requests.fetch_add(1, Ordering::SeqCst);
        let decision = *lock(&self.always_decision);
        if let Some(decision) = decision {
            self.set_status(decision);
        }
    }
}

/// A location fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// In-process stand-in for the SDK's location updates.
#[derive(Debug, Default)]
pub struct InMemoryLocationServices {
    enabled: AtomicBool,
    last_fix: Mutex<Option<LocationFix>>,
}

impl InMemoryLocationServices {
    /// Creates disabled location services.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates location services that are already enabled.
    #[must_use]
    pub const fn enabled() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            last_fix: Mutex::new(None),
        }
    }

    /// Records a fix. Ignored while updates are disabled.
    pub fn record_fix(&self, fix: LocationFix) {
        if self.enabled.load(Ordering::SeqCst) {
            *lock(&self.last_fix) = Some(fix);
        }
    }

    /// Last recorded fix.
    #[must_use]
    pub fn last_fix(&self) -> Option<LocationFix> {
        *lock(&self.last_fix)
    }
}

#[async_trait]
impl LocationServices for InMemoryLocationServices {
    async fn has_location_services_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    async fn enable_location_updates(&self) {
        self.enabled.store(true, Ordering::SeqCst);
        tracing::debug!("Location updates enabled");
    }

    async fn disable_location_updates(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        *lock(&self.last_fix) = None;
        tracing::debug!("Location updates disabled");
    }
}
