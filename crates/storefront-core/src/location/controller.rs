//! Location permission state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

use super::{AuthorizationStatus, LocationServices, PermissionPlatform, RequestResult};

/// Records whether the "always" prompt has been shown.
///
/// The platform only shows that prompt once per process, so the flag is
/// shared by every controller and never reset. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct AlwaysPermissionFlag(Arc<AtomicBool>);

impl AlwaysPermissionFlag {
    /// Creates an unset flag, independent of the process-wide one.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide flag.
    #[must_use]
    pub fn global() -> Self {
        static GLOBAL: OnceLock<AlwaysPermissionFlag> = OnceLock::new();
        GLOBAL.get_or_init(Self::new).clone()
    }

    /// Whether the "always" prompt has been shown.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Marks the "always" prompt as shown.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Drives location permissions and the SDK's location updates.
///
/// At most one [`request_permissions`](Self::request_permissions) call waits
/// for a prompt at a time. A second call made while one is waiting takes its
/// place, and the earlier call never completes.
pub struct LocationController<P, S> {
    platform: Arc<P>,
    services: Arc<S>,
    request_always_authorization: AtomicBool,
    always_requested: AlwaysPermissionFlag,
    pending: Mutex<Option<oneshot::Sender<RequestResult>>>,
    capabilities_changed: broadcast::Sender<()>,
}

impl<P, S> LocationController<P, S>
where
    P: PermissionPlatform + 'static,
    S: LocationServices + 'static,
{
    /// Creates a controller using the process-wide "always" flag.
    #[must_use]
    pub fn new(platform: Arc<P>, services: Arc<S>, request_always_authorization: bool) -> Self {
        let (capabilities_changed, _) = broadcast::channel(16);
        Self {
            platform,
            services,
            request_always_authorization: AtomicBool::new(request_always_authorization),
            always_requested: AlwaysPermissionFlag::global(),
            pending: Mutex::new(None),
            capabilities_changed,
        }
    }

    /// Replaces the "always" flag, e.g. with one scoped to a test.
    #[must_use]
    pub fn with_always_permission_flag(mut self, flag: AlwaysPermissionFlag) -> Self {
        self.always_requested = flag;
        self
    }

    /// Whether the controller tries to upgrade to "always" authorization.
    #[must_use]
    pub fn request_always_authorization(&self) -> bool {
        self.request_always_authorization.load(Ordering::SeqCst)
    }

    /// Enables or disables upgrading to "always" authorization.
    pub fn set_request_always_authorization(&self, enabled: bool) {
        self.request_always_authorization
            .store(enabled, Ordering::SeqCst);
    }

    /// Whether location updates are enabled and permitted.
    pub async fn has_location_tracking_capabilities(&self) -> bool {
        self.services.has_location_services_enabled().await
            && self.platform.authorization_status().is_authorized()
    }

    /// Whether geofencing is possible, which needs "always" authorization.
    #[must_use]
    pub fn has_geofencing_capabilities(&self) -> bool {
        self.platform.authorization_status() == AuthorizationStatus::AuthorizedAlways
    }

    /// Subscribes to capability changes, emitted after every handled
    /// authorization change.
    #[must_use]
    pub fn subscribe_capabilities(&self) -> broadcast::Receiver<()> {
        self.capabilities_changed.subscribe()
    }

    /// Stops location updates.
    pub async fn disable_location_updates(&self) {
        self.services.disable_location_updates().await;
    }

    /// Requests location permissions appropriate to the current state.
    ///
    /// When the user has not been asked yet this waits until the prompt is
    /// answered, which is reported through
    /// [`handle_authorization_change`](Self::handle_authorization_change).
    pub async fn request_permissions(&self) -> RequestResult {
        let status = self.platform.authorization_status();
        tracing::debug!("Requesting location permissions in state {}", status);

        match status {
            AuthorizationStatus::NotDetermined => {
                let (sender, receiver) = oneshot::channel();
                let superseded = self.pending().replace(sender).is_some();
                if superseded {
                    tracing::warn!("Superseding a pending location permission request");
                }

                self.platform.request_when_in_use_authorization();

                match receiver.await {
                    Ok(result) => result,
                    // Superseded by a later request.
                    Err(_) => std::future::pending().await,
                }
            }
            AuthorizationStatus::Restricted => RequestResult::Restricted,
            AuthorizationStatus::Denied => RequestResult::RequiresChangeInSettings,
            AuthorizationStatus::AuthorizedAlways => {
                self.services.enable_location_updates().await;
                RequestResult::Ok
            }
            AuthorizationStatus::AuthorizedWhenInUse => {
                if !self.request_always_authorization() {
                    if !self.services.has_location_services_enabled().await {
                        self.services.enable_location_updates().await;
                    }
                    return RequestResult::Ok;
                }

                if self.always_requested.is_set() {
                    self.services.enable_location_updates().await;
                    return RequestResult::RequiresChangeInSettings;
                }

                self.always_requested.set();
                tracing::info!("Requesting always location authorization");
                self.platform.request_always_authorization();
                RequestResult::Ok
            }
            AuthorizationStatus::AuthorizedLegacy | AuthorizationStatus::Unknown => {
                RequestResult::Ok
            }
        }
    }

    /// Reacts to a platform authorization change.
    ///
    /// An authorized status that arrives while location updates are still
    /// off and no request is waiting is the platform's startup callback; it
    /// is ignored. Any other change updates location updates, completes the
    /// waiting request and emits a capability change.
    pub async fn handle_authorization_change(&self, status: AuthorizationStatus) {
        if status.is_authorized()
            && !self.has_pending_request()
            && !self.services.has_location_services_enabled().await
        {
            tracing::info!("Ignoring startup authorization status {}", status);
            return;
        }

        tracing::debug!("Location authorization changed to {}", status);

        let result = match status {
            AuthorizationStatus::Denied => {
                self.services.disable_location_updates().await;
                RequestResult::Denied
            }
            AuthorizationStatus::AuthorizedAlways => {
                self.services.enable_location_updates().await;
                RequestResult::Ok
            }
            AuthorizationStatus::AuthorizedWhenInUse => {
                self.services.enable_location_updates().await;

                if self.request_always_authorization() {
                    self.always_requested.set();
                    tracing::info!("Upgrading to always location authorization");
                    self.platform.request_always_authorization();
                }
                RequestResult::Ok
            }
            _ => RequestResult::Ok,
        };

        self.resolve_pending(result);

        if self.capabilities_changed.send(()).is_err() {
            tracing::trace!("No capability observers");
        }
    }

    /// Feeds every status received on `changes` into
    /// [`handle_authorization_change`](Self::handle_authorization_change).
    pub fn listen(
        self: Arc<Self>,
        mut changes: broadcast::Receiver<AuthorizationStatus>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(status) => self.handle_authorization_change(status).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Missed {} authorization changes", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn pending(&self) -> MutexGuard<'_, Option<oneshot::Sender<RequestResult>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn has_pending_request(&self) -> bool {
        self.pending().is_some()
    }

    fn resolve_pending(&self, result: RequestResult) {
        let sender = self.pending().take();
        if let Some(sender) = sender
            && sender.send(result).is_err()
        {
            tracing::debug!("Location permission requester went away");
        }
    }
}
