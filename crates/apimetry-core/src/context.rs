//! Request context types.
//!
//! The [`RequestContext`] carries per-request state out of the interception
//! pipeline and into handlers. It is immutable by the time a handler sees it.

use crate::identity::MerchantIdentity;
use crate::markers::RouteMarkers;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use apimetry_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request context handed to handlers after the pipeline has run.
///
/// Carries the request ID, the route markers resolved at dispatch time and,
/// when authentication succeeded, the resolved merchant identity. Created at
/// request entry, discarded at request exit, never shared across requests.
///
/// # Example
///
/// ```
/// use apimetry_core::{MerchantIdentity, RequestContext, RouteMarkers};
///
/// let ctx = RequestContext::new(RouteMarkers::new())
///     .with_merchant(MerchantIdentity::new(7, "Acme", "tok-123"));
/// assert_eq!(ctx.merchant_id(), Some(7));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// Markers resolved from the matched route.
    markers: RouteMarkers,

    /// The resolved merchant, present only after successful authentication.
    merchant: Option<MerchantIdentity>,

    /// The operation ID of the matched route (e.g., "getMerchantOrders").
    operation_id: Option<String>,

    /// When the request started processing.
    started_at: Instant,
}

impl RequestContext {
    /// Creates a new request context with a fresh request ID.
    #[must_use]
    pub fn new(markers: RouteMarkers) -> Self {
        Self {
            request_id: RequestId::new(),
            markers,
            merchant: None,
            operation_id: None,
            started_at: Instant::now(),
        }
    }

    /// Creates a new request context with the specified request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId, markers: RouteMarkers) -> Self {
        Self {
            request_id,
            markers,
            merchant: None,
            operation_id: None,
            started_at: Instant::now(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the route markers.
    #[must_use]
    pub const fn markers(&self) -> RouteMarkers {
        self.markers
    }

    /// Returns the resolved merchant identity, if authentication succeeded.
    #[must_use]
    pub const fn merchant(&self) -> Option<&MerchantIdentity> {
        self.merchant.as_ref()
    }

    /// Returns the resolved merchant ID.
    ///
    /// This is the request-scoped publication the auth stage makes for
    /// downstream handlers, so they never re-resolve the credential.
    #[must_use]
    pub fn merchant_id(&self) -> Option<i64> {
        self.merchant.as_ref().map(|m| m.id)
    }

    /// Returns a new context with the specified merchant identity.
    #[must_use]
    pub fn with_merchant(mut self, merchant: MerchantIdentity) -> Self {
        self.merchant = Some(merchant);
        self
    }

    /// Returns the operation ID if set.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Returns a new context with the specified operation ID.
    #[must_use]
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_new_generates_unique_ids() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2, "Each RequestId should be unique");
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::new();
        let display = id.to_string();
        assert_eq!(display.len(), 36, "UUID string should be 36 characters");
        assert!(display.contains('-'), "UUID should contain hyphens");
    }

    #[test]
    fn test_request_id_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).expect("serialization should work");
        let parsed: RequestId = serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_context_starts_unauthenticated() {
        let ctx = RequestContext::new(RouteMarkers::new());
        assert!(ctx.merchant().is_none());
        assert!(ctx.merchant_id().is_none());
        assert!(ctx.operation_id().is_none());
    }

    #[test]
    fn test_context_builder_pattern() {
        let ctx = RequestContext::new(RouteMarkers::new().skip_body())
            .with_merchant(MerchantIdentity::new(7, "Acme", "tok-123"))
            .with_operation_id("getMerchantOrders");

        assert_eq!(ctx.merchant_id(), Some(7));
        assert_eq!(ctx.operation_id(), Some("getMerchantOrders"));
        assert!(ctx.markers().skip_body);
    }

    #[test]
    fn test_context_elapsed() {
        let ctx = RequestContext::new(RouteMarkers::new());
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(ctx.elapsed() >= std::time::Duration::from_millis(10));
    }
}
