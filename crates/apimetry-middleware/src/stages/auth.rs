//! Authentication gate.
//!
//! First stage of the pipeline. Extracts the credential token from the
//! `Authorization` header and resolves it through the configured
//! [`MerchantResolver`].
//!
//! # Behavior
//!
//! - Missing or blank credential: pass through anonymously when the route
//!   carries the `no_auth` marker, otherwise reject with 403.
//! - Credential present: a resolver miss rejects with 403 regardless of how
//!   well-formed the token looks; a hit publishes the merchant into the
//!   context so later stages and the handler never re-resolve it. A header
//!   value that cannot be decoded as a string counts as present, so it is
//!   rejected even on `no_auth` routes.
//!
//! A rejection short-circuits the chain: the handler is never invoked.

use crate::context::InterceptContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};
use apimetry_core::MerchantResolver;
use http::StatusCode;
use std::sync::Arc;

/// Header carrying the opaque credential token.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// What the `Authorization` header held, before any resolution.
enum RawCredential<'a> {
    /// No header, or a blank value.
    Absent,
    /// A header was sent but its value is not a decodable string.
    Undecodable,
    /// A non-blank token to resolve.
    Token(&'a str),
}

/// Middleware gating every request on credential resolution.
pub struct AuthGate {
    /// Identity store seam.
    resolver: Arc<dyn MerchantResolver>,
}

impl AuthGate {
    /// Creates an auth gate backed by the given resolver.
    #[must_use]
    pub fn new(resolver: Arc<dyn MerchantResolver>) -> Self {
        Self { resolver }
    }

    /// Extracts the credential token, treating blank values as absent.
    ///
    /// A header that is present but not decodable as a string is still a
    /// presented credential, never an absent one: it must be rejected even
    /// on routes that permit anonymous access.
    fn extract_token(request: &Request) -> RawCredential<'_> {
        let Some(value) = request.headers().get(AUTHORIZATION_HEADER) else {
            return RawCredential::Absent;
        };
        match value.to_str() {
            Ok(token) => match token.trim() {
                "" => RawCredential::Absent,
                token => RawCredential::Token(token),
            },
            Err(_) => RawCredential::Undecodable,
        }
    }

    fn reject(ctx: &InterceptContext, reason: &str) -> Response {
        tracing::debug!(
            request_id = %ctx.request_id(),
            reason,
            "request rejected by auth gate"
        );
        Response::json_error(
            StatusCode::FORBIDDEN,
            "authorization_failed",
            "authorization failed",
        )
    }
}

impl Middleware for AuthGate {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut InterceptContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let token = match Self::extract_token(&request) {
                RawCredential::Token(token) => token,
                RawCredential::Absent => {
                    if ctx.markers().no_auth {
                        tracing::trace!(
                            request_id = %ctx.request_id(),
                            "anonymous access permitted by route marker"
                        );
                        return next.run(ctx, request).await;
                    }
                    return Self::reject(ctx, "missing or blank credential");
                }
                RawCredential::Undecodable => {
                    return Self::reject(ctx, "credential not decodable");
                }
            };

            match self.resolver.find_by_token(token).await {
                Some(merchant) => {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        merchant = %merchant.log_id(),
                        "credential resolved"
                    );
                    ctx.set_merchant(merchant);
                    next.run(ctx, request).await
                }
                None => Self::reject(ctx, "credential not recognized"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::CachedBody;
    use apimetry_core::fixtures::FixedResolver;
    use apimetry_core::{MerchantIdentity, RouteMarkers};
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response as HttpResponse};
    use http_body_util::Full;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn gate_with_acme() -> AuthGate {
        AuthGate::new(Arc::new(
            FixedResolver::default().with_merchant(MerchantIdentity::new(7, "Acme", "tok-123")),
        ))
    }

    fn request(auth: Option<&str>) -> Request {
        let mut builder = HttpRequest::builder().uri("/merchants/orders");
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION_HEADER, auth);
        }
        builder.body(CachedBody::empty()).unwrap()
    }

    fn tracking_handler(invoked: Arc<AtomicBool>) -> Next<'static> {
        Next::handler(move |_ctx, _req| {
            invoked.store(true, Ordering::SeqCst);
            Box::pin(async {
                HttpResponse::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(Bytes::from("OK")))
                    .unwrap()
            })
        })
    }

    #[tokio::test]
    async fn test_missing_credential_is_rejected() {
        let gate = gate_with_acme();
        let mut ctx = InterceptContext::new(RouteMarkers::new());
        let invoked = Arc::new(AtomicBool::new(false));

        let response = gate
            .process(&mut ctx, request(None), tracking_handler(invoked.clone()))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!invoked.load(Ordering::SeqCst), "handler must not run");
        assert!(ctx.merchant().is_none());
    }

    #[tokio::test]
    async fn test_blank_credential_is_rejected() {
        let gate = gate_with_acme();
        let mut ctx = InterceptContext::new(RouteMarkers::new());
        let invoked = Arc::new(AtomicBool::new(false));

        let response = gate
            .process(
                &mut ctx,
                request(Some("   ")),
                tracking_handler(invoked.clone()),
            )
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_missing_credential_with_no_auth_marker_passes() {
        let gate = gate_with_acme();
        let mut ctx = InterceptContext::new(RouteMarkers::new().no_auth());
        let invoked = Arc::new(AtomicBool::new(false));

        let response = gate
            .process(&mut ctx, request(None), tracking_handler(invoked.clone()))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(invoked.load(Ordering::SeqCst));
        assert!(ctx.merchant().is_none(), "anonymous pass-through");
    }

    #[tokio::test]
    async fn test_resolved_credential_publishes_merchant() {
        let gate = gate_with_acme();
        let mut ctx = InterceptContext::new(RouteMarkers::new());
        let invoked = Arc::new(AtomicBool::new(false));

        let response = gate
            .process(
                &mut ctx,
                request(Some("tok-123")),
                tracking_handler(invoked.clone()),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(invoked.load(Ordering::SeqCst));
        assert_eq!(ctx.merchant_id(), Some(7));
    }

    #[tokio::test]
    async fn test_unknown_credential_is_rejected_even_on_no_auth_route() {
        // A presented-but-bogus token is a rejection; no_auth only covers
        // the absent-credential case.
        let gate = gate_with_acme();
        let mut ctx = InterceptContext::new(RouteMarkers::new().no_auth());
        let invoked = Arc::new(AtomicBool::new(false));

        let response = gate
            .process(
                &mut ctx,
                request(Some("bogus")),
                tracking_handler(invoked.clone()),
            )
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_undecodable_credential_is_rejected_even_on_no_auth_route() {
        // Present-but-undecodable is a presented credential, not an absent
        // one; anonymous pass-through must not apply.
        let gate = gate_with_acme();
        let mut ctx = InterceptContext::new(RouteMarkers::new().no_auth());
        let invoked = Arc::new(AtomicBool::new(false));

        let mut request = request(None);
        request.headers_mut().insert(
            AUTHORIZATION_HEADER,
            http::HeaderValue::from_bytes(b"tok-\xFF").unwrap(),
        );

        let response = gate
            .process(&mut ctx, request, tracking_handler(invoked.clone()))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!invoked.load(Ordering::SeqCst));
        assert!(ctx.merchant().is_none());
    }

    #[test]
    fn test_stage_name() {
        assert_eq!(gate_with_acme().name(), "auth");
    }
}
