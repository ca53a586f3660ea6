//! Telemetry decoration.
//!
//! Second stage of the pipeline, after the auth gate. Attaches per-merchant
//! attributes to the active trace span:
//!
//! - `apimetry.customer.id` - resolved merchant id
//! - `apimetry.customer.name` - resolved merchant name
//! - `http.body` - full request body text, via the body cache
//!
//! Decoration degrades gracefully: a `skip_all` marker, an anonymous
//! request, or an absent span handle all turn the stage into a no-op rather
//! than failing the request. The one caller-visible failure is a body cache
//! read error, which short-circuits with a 500 so the handler never sees a
//! half-consumed stream.

use crate::context::InterceptContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};
use http::StatusCode;

/// Span attribute key for the merchant id.
pub const CUSTOMER_ID_ATTRIBUTE: &str = "apimetry.customer.id";

/// Span attribute key for the merchant name.
pub const CUSTOMER_NAME_ATTRIBUTE: &str = "apimetry.customer.name";

/// Span attribute key for the request body.
pub const HTTP_BODY_ATTRIBUTE: &str = "http.body";

/// Middleware attaching merchant and body attributes to the active span.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryDecorator;

impl TelemetryDecorator {
    /// Creates a new telemetry decorator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for TelemetryDecorator {
    fn name(&self) -> &'static str {
        "telemetry"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut InterceptContext,
        mut request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            // skip_all has the highest precedence: nothing is attached, not
            // even identity attributes.
            if ctx.markers().skip_all {
                return next.run(ctx, request).await;
            }

            // No merchant (anonymous pass-through) or no span (tracing
            // disabled upstream): decoration is a no-op, never an error.
            let decorated = match (ctx.merchant(), ctx.span()) {
                (Some(merchant), Some(span)) => {
                    // Identity attributes always precede body capture.
                    span.set_attribute(CUSTOMER_ID_ATTRIBUTE, merchant.id.into());
                    span.set_attribute(CUSTOMER_NAME_ATTRIBUTE, merchant.name.clone().into());
                    true
                }
                _ => false,
            };

            if decorated && !ctx.markers().skip_body {
                // The body comes from the cache, never the raw source, so
                // the handler still receives an intact, re-readable body.
                match request.body_mut().read() {
                    Ok(bytes) if bytes.is_empty() => {}
                    Ok(bytes) => {
                        if let Ok(text) = std::str::from_utf8(&bytes) {
                            if let Some(span) = ctx.span() {
                                span.set_attribute(HTTP_BODY_ATTRIBUTE, text.into());
                            }
                        } else {
                            tracing::trace!(
                                request_id = %ctx.request_id(),
                                "request body is not UTF-8, skipping body attribute"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            request_id = %ctx.request_id(),
                            error = %e,
                            "failed to buffer request body"
                        );
                        return Response::json_error(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "body_read_failed",
                            "failed to read request body",
                        );
                    }
                }
            }

            next.run(ctx, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::CachedBody;
    use apimetry_core::fixtures::RecordingSpan;
    use apimetry_core::{AttributeValue, MerchantIdentity, RouteMarkers};
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response as HttpResponse};
    use http_body_util::Full;
    use std::io;
    use std::sync::Arc;

    fn ok_handler() -> Next<'static> {
        Next::handler(|_ctx, _req| {
            Box::pin(async {
                HttpResponse::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(Bytes::from("OK")))
                    .unwrap()
            })
        })
    }

    fn request_with_body(body: &'static [u8]) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/merchants/orders")
            .body(CachedBody::from_bytes(Bytes::from_static(body)))
            .unwrap()
    }

    fn authed_ctx(markers: RouteMarkers, span: Option<Arc<RecordingSpan>>) -> InterceptContext {
        let mut ctx = InterceptContext::new(markers);
        ctx.set_merchant(MerchantIdentity::new(7, "Acme", "tok-123"));
        if let Some(span) = span {
            ctx.set_span(span);
        }
        ctx
    }

    #[tokio::test]
    async fn test_attaches_identity_and_body_attributes() {
        let span = Arc::new(RecordingSpan::default());
        let mut ctx = authed_ctx(RouteMarkers::new(), Some(span.clone()));
        let decorator = TelemetryDecorator::new();

        let response = decorator
            .process(&mut ctx, request_with_body(br#"{"a":1}"#), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let attrs = span.attributes();
        assert_eq!(attrs.len(), 3);
        assert_eq!(
            attrs[0],
            (CUSTOMER_ID_ATTRIBUTE.to_string(), AttributeValue::I64(7))
        );
        assert_eq!(
            attrs[1],
            (
                CUSTOMER_NAME_ATTRIBUTE.to_string(),
                AttributeValue::Str("Acme".to_string())
            )
        );
        assert_eq!(
            attrs[2],
            (
                HTTP_BODY_ATTRIBUTE.to_string(),
                AttributeValue::Str(r#"{"a":1}"#.to_string())
            )
        );
    }

    #[tokio::test]
    async fn test_skip_all_attaches_nothing() {
        let span = Arc::new(RecordingSpan::default());
        let mut ctx = authed_ctx(RouteMarkers::new().skip_all(), Some(span.clone()));

        let response = TelemetryDecorator::new()
            .process(&mut ctx, request_with_body(br#"{"a":1}"#), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(span.attributes().is_empty());
    }

    #[tokio::test]
    async fn test_skip_body_keeps_identity_attributes_only() {
        let span = Arc::new(RecordingSpan::default());
        let mut ctx = authed_ctx(RouteMarkers::new().skip_body(), Some(span.clone()));

        let response = TelemetryDecorator::new()
            .process(&mut ctx, request_with_body(br#"{"a":1}"#), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let attrs = span.attributes();
        assert_eq!(attrs.len(), 2);
        assert!(attrs.iter().all(|(k, _)| k != HTTP_BODY_ATTRIBUTE));
    }

    #[tokio::test]
    async fn test_anonymous_request_is_a_noop() {
        let span = Arc::new(RecordingSpan::default());
        let mut ctx = InterceptContext::new(RouteMarkers::new().no_auth());
        ctx.set_span(span.clone());

        let response = TelemetryDecorator::new()
            .process(&mut ctx, request_with_body(br#"{"a":1}"#), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(span.attributes().is_empty());
    }

    #[tokio::test]
    async fn test_absent_span_is_a_noop() {
        let mut ctx = authed_ctx(RouteMarkers::new(), None);

        let response = TelemetryDecorator::new()
            .process(&mut ctx, request_with_body(br#"{"a":1}"#), ok_handler())
            .await;

        // No span to decorate; the request still succeeds.
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_body_sets_no_body_attribute() {
        let span = Arc::new(RecordingSpan::default());
        let mut ctx = authed_ctx(RouteMarkers::new(), Some(span.clone()));

        let response = TelemetryDecorator::new()
            .process(&mut ctx, request_with_body(b""), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(span.attributes().len(), 2);
    }

    #[tokio::test]
    async fn test_body_read_failure_is_caller_visible() {
        struct Broken;

        impl io::Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::UnexpectedEof, "closed"))
            }
        }

        let span = Arc::new(RecordingSpan::default());
        let mut ctx = authed_ctx(RouteMarkers::new(), Some(span.clone()));
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/merchants")
            .body(CachedBody::new(Broken))
            .unwrap();

        let handler = Next::handler(|_ctx, _req| {
            Box::pin(async { unreachable!("handler must not run after a body read failure") })
        });

        let response = TelemetryDecorator::new()
            .process(&mut ctx, request, handler)
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Identity attributes were already attached before the body failed.
        assert_eq!(span.attributes().len(), 2);
    }

    #[test]
    fn test_stage_name() {
        assert_eq!(TelemetryDecorator::new().name(), "telemetry");
    }
}
