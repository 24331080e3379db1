//! Authorization states and request outcomes.

use std::fmt;

/// Platform location authorization status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthorizationStatus {
    /// The user has not been asked yet.
    #[default]
    NotDetermined,
    /// Access is restricted, e.g. by parental controls.
    Restricted,
    /// The user denied access.
    Denied,
    /// Access granted at all times, including in the background.
    AuthorizedAlways,
    /// Access granted while the app is in use.
    AuthorizedWhenInUse,
    /// Deprecated equivalent of `AuthorizedAlways`.
    AuthorizedLegacy,
    /// A status value this app does not recognise.
    Unknown,
}

impl AuthorizationStatus {
    /// Whether location updates may be collected in this state.
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self, Self::AuthorizedAlways | Self::AuthorizedWhenInUse)
    }

    /// String representation, for logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotDetermined => "not_determined",
            Self::Restricted => "restricted",
            Self::Denied => "denied",
            Self::AuthorizedAlways => "authorized_always",
            Self::AuthorizedWhenInUse => "authorized_when_in_use",
            Self::AuthorizedLegacy => "authorized",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestResult {
    /// Permission is in place (or the state needs no action).
    Ok,
    /// The user denied the request.
    Denied,
    /// Access is restricted and cannot be requested.
    Restricted,
    /// The user must change the permission in the system settings.
    RequiresChangeInSettings,
}
