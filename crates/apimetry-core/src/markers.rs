//! Per-endpoint interception markers.
//!
//! Markers are resolved once at route-registration time from declarative
//! per-route configuration, not reflected at request time. They are read-only
//! for the life of a request.

use serde::{Deserialize, Serialize};

/// Declarative per-endpoint flags controlling auth and telemetry behavior.
///
/// All flags default to `false`: a route requires authentication and gets
/// full telemetry decoration unless it opts out.
///
/// # Example
///
/// ```
/// use apimetry_core::RouteMarkers;
///
/// // POST /merchants: open endpoint, no telemetry at all
/// let create = RouteMarkers::new().no_auth().skip_all();
/// assert!(create.no_auth);
/// assert!(create.skip_all);
///
/// // GET /merchants/orders: authenticated, identity attributes only
/// let orders = RouteMarkers::new().skip_body();
/// assert!(!orders.no_auth);
/// assert!(orders.skip_body);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMarkers {
    /// Anonymous access is permitted; a missing credential is not a rejection.
    pub no_auth: bool,

    /// Skip telemetry decoration entirely for this endpoint.
    ///
    /// Checked before anything else in the telemetry stage: when set, no
    /// span attribute is ever written, regardless of identity or body state.
    pub skip_all: bool,

    /// Skip the request-body span attribute, but still attach identity
    /// attributes.
    pub skip_body: bool,
}

impl RouteMarkers {
    /// Creates markers with all flags cleared (auth required, full telemetry).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Permits anonymous access to the endpoint.
    #[must_use]
    pub const fn no_auth(mut self) -> Self {
        self.no_auth = true;
        self
    }

    /// Skips telemetry decoration entirely.
    #[must_use]
    pub const fn skip_all(mut self) -> Self {
        self.skip_all = true;
        self
    }

    /// Skips the body attribute while keeping identity attributes.
    #[must_use]
    pub const fn skip_body(mut self) -> Self {
        self.skip_body = true;
        self
    }
}
