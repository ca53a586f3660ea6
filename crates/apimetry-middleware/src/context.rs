//! Pipeline context.
//!
//! The [`InterceptContext`] carries mutable state through the interception
//! pipeline: the auth gate publishes the resolved merchant into it, the
//! telemetry stage reads the merchant, markers and span handle back out.
//! Once the pre-handler stages are done it converts into the immutable
//! [`RequestContext`] handed to handlers.

use apimetry_core::{MerchantIdentity, RequestContext, RequestId, RouteMarkers, SharedSpan};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;

/// Mutable per-request state flowing through the pipeline.
///
/// Created at request entry with the markers resolved from the matched
/// route, discarded at request exit. One request is handled by one logical
/// flow of control, so no locking happens here.
///
/// # Example
///
/// ```
/// use apimetry_core::{MerchantIdentity, RouteMarkers};
/// use apimetry_middleware::context::InterceptContext;
///
/// let mut ctx = InterceptContext::new(RouteMarkers::new());
/// ctx.set_merchant(MerchantIdentity::new(7, "Acme", "tok-123"));
/// assert_eq!(ctx.merchant_id(), Some(7));
/// ```
#[derive(Debug)]
pub struct InterceptContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// Markers resolved once from the matched route.
    markers: RouteMarkers,

    /// The resolved merchant, set by the auth gate on success.
    merchant: Option<MerchantIdentity>,

    /// Handle to the active trace span, absent when tracing is disabled.
    span: Option<SharedSpan>,

    /// The operation ID of the matched route.
    operation_id: Option<String>,

    /// When the request started processing.
    started_at: Instant,

    /// Type-erased extension data for stage-to-handler communication.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl InterceptContext {
    /// Creates a new context with a fresh request ID.
    #[must_use]
    pub fn new(markers: RouteMarkers) -> Self {
        Self::with_request_id(RequestId::new(), markers)
    }

    /// Creates a context with a specific request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId, markers: RouteMarkers) -> Self {
        Self {
            request_id,
            markers,
            merchant: None,
            span: None,
            operation_id: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
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

    /// Returns the resolved merchant, if the auth gate succeeded.
    #[must_use]
    pub const fn merchant(&self) -> Option<&MerchantIdentity> {
        self.merchant.as_ref()
    }

    /// Returns the resolved merchant ID.
    ///
    /// Request-scoped publication for downstream consumers; set exactly once
    /// by the auth gate.
    #[must_use]
    pub fn merchant_id(&self) -> Option<i64> {
        self.merchant.as_ref().map(|m| m.id)
    }

    /// Records the resolved merchant.
    ///
    /// Only the auth gate should call this.
    pub fn set_merchant(&mut self, merchant: MerchantIdentity) {
        self.merchant = Some(merchant);
    }

    /// Returns the active span handle, if tracing is enabled.
    #[must_use]
    pub fn span(&self) -> Option<&SharedSpan> {
        self.span.as_ref()
    }

    /// Attaches the active span handle.
    ///
    /// Set once by the server before the pipeline runs.
    pub fn set_span(&mut self, span: SharedSpan) {
        self.span = Some(span);
    }

    /// Returns the operation ID, if resolved.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Sets the operation ID after routing resolves the path.
    pub fn set_operation_id(&mut self, operation_id: impl Into<String>) {
        self.operation_id = Some(operation_id.into());
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Checks whether an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }

    /// Converts this context to the immutable [`RequestContext`] for handlers.
    #[must_use]
    pub fn to_request_context(&self) -> RequestContext {
        let mut ctx = RequestContext::with_request_id(self.request_id, self.markers);

        if let Some(merchant) = &self.merchant {
            ctx = ctx.with_merchant(merchant.clone());
        }

        if let Some(op_id) = &self.operation_id {
            ctx = ctx.with_operation_id(op_id.clone());
        }

        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apimetry_core::fixtures::RecordingSpan;
    use std::sync::Arc;

    #[test]
    fn test_new_context_is_unauthenticated() {
        let ctx = InterceptContext::new(RouteMarkers::new());
        assert!(ctx.merchant().is_none());
        assert!(ctx.span().is_none());
        assert!(ctx.operation_id().is_none());
    }

    #[test]
    fn test_set_merchant_publishes_id() {
        let mut ctx = InterceptContext::new(RouteMarkers::new());
        ctx.set_merchant(MerchantIdentity::new(7, "Acme", "tok-123"));
        assert_eq!(ctx.merchant_id(), Some(7));
        assert_eq!(ctx.merchant().map(|m| m.name.as_str()), Some("Acme"));
    }

    #[test]
    fn test_span_handle_round_trip() {
        let mut ctx = InterceptContext::new(RouteMarkers::new());
        ctx.set_span(Arc::new(RecordingSpan::default()));
        assert!(ctx.span().is_some());
    }

    #[test]
    fn test_markers_are_read_only_copies() {
        let ctx = InterceptContext::new(RouteMarkers::new().skip_body());
        assert!(ctx.markers().skip_body);
        assert!(!ctx.markers().skip_all);
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, PartialEq)]
        struct RouteParams(Vec<(String, String)>);

        let mut ctx = InterceptContext::new(RouteMarkers::new());
        assert!(!ctx.has_extension::<RouteParams>());

        ctx.set_extension(RouteParams(vec![("id".into(), "7".into())]));
        assert!(ctx.has_extension::<RouteParams>());
        assert_eq!(
            ctx.get_extension::<RouteParams>(),
            Some(&RouteParams(vec![("id".into(), "7".into())]))
        );
    }

    #[test]
    fn test_to_request_context() {
        let mut ctx = InterceptContext::new(RouteMarkers::new().skip_body());
        ctx.set_merchant(MerchantIdentity::new(7, "Acme", "tok-123"));
        ctx.set_operation_id("getMerchantOrders");

        let req_ctx = ctx.to_request_context();
        assert_eq!(req_ctx.request_id(), ctx.request_id());
        assert_eq!(req_ctx.merchant_id(), Some(7));
        assert_eq!(req_ctx.operation_id(), Some("getMerchantOrders"));
        assert!(req_ctx.markers().skip_body);
    }
}
