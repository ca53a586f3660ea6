//! HTTP server wired to the interception pipeline.
//!
//! Built on hyper and tokio. Each request is routed, its body is collected
//! into a [`CachedBody`] (the single drain of the network stream), and the
//! result flows through the standard pipeline: auth gate, telemetry
//! decoration, then the registered handler.
//!
//! # Example
//!
//! ```rust,ignore
//! use apimetry_server::{MerchantStore, Server};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MerchantStore::new());
//!     let server = Server::builder(store)
//!         .http_addr("0.0.0.0:8080")
//!         .build();
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpListener;

use apimetry_core::{MerchantResolver, RouteMarkers, SpanSource};
use apimetry_middleware::{CachedBody, InterceptContext, InterceptPipeline, ResponseExt};

use crate::config::ServerConfig;
use crate::handler::HandlerRegistry;
use crate::router::Router;

/// Type alias for the HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// Server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the configured address.
    #[error("Bind error: {0}")]
    Bind(String),

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The Apimetry HTTP server.
///
/// Owns the router, the handler registry, and the interception pipeline.
pub struct Server {
    config: ServerConfig,
    router: Router,
    handlers: HandlerRegistry,
    pipeline: InterceptPipeline,
    span_source: Option<Arc<dyn SpanSource>>,
}

impl Server {
    /// Creates a new server builder around a credential resolver.
    ///
    /// The resolver feeds the auth gate of the standard pipeline.
    #[must_use]
    pub fn builder(resolver: Arc<dyn MerchantResolver>) -> ServerBuilder {
        ServerBuilder::new(resolver)
    }

    /// Returns a reference to the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Returns a mutable reference to the router.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Returns a reference to the handler registry.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Returns a mutable reference to the handler registry.
    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }

    /// Returns a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs the server until Ctrl+C is received.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to the configured address.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await
    }

    /// Runs the server until the given future completes.
    ///
    /// Useful for tests or programmatic shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to the configured address.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!(
                "Invalid address '{}': {}",
                self.config.http_addr(),
                e
            ))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("Failed to bind to {addr}: {e}")))?;

        tracing::info!("Server listening on {}", addr);

        let server = Arc::new(self);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            tokio::spawn(async move {
                                let io = TokioIo::new(stream);
                                let service = service_fn(move |req: Request<Incoming>| {
                                    let server = Arc::clone(&server);
                                    async move { server.handle_request(req).await }
                                });

                                if let Err(e) =
                                    http1::Builder::new().serve_connection(io, service).await
                                {
                                    tracing::error!(
                                        "Connection error from {}: {}",
                                        remote_addr,
                                        e
                                    );
                                }
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }

                () = &mut shutdown => {
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Handles a single HTTP request from the transport.
    async fn handle_request(
        self: &Arc<Self>,
        req: Request<Incoming>,
    ) -> Result<HttpResponse, Infallible> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        tracing::debug!("{} {}", method, path);

        let (parts, body) = req.into_parts();

        // Collecting the transport stream is the single drain of the network
        // source; everything downstream reads from the cache.
        let collected = tokio::time::timeout(self.config.request_timeout(), body.collect()).await;

        let bytes = match collected {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) => {
                tracing::error!("Failed to collect request body: {}", e);
                return Ok(HttpResponse::json_error(
                    StatusCode::BAD_REQUEST,
                    "body_read_failed",
                    &format!("Failed to read request body: {e}"),
                ));
            }
            Err(_) => {
                tracing::warn!("Request body collection timed out");
                return Ok(HttpResponse::json_error(
                    StatusCode::REQUEST_TIMEOUT,
                    "request_timeout",
                    "Request body collection timed out",
                ));
            }
        };

        let request = Request::from_parts(parts, CachedBody::from_bytes(bytes));

        let response = tokio::time::timeout(self.config.request_timeout(), self.dispatch(request))
            .await
            .unwrap_or_else(|_| {
                tracing::warn!("Handler execution timed out for {} {}", method, path);
                HttpResponse::json_error(
                    StatusCode::GATEWAY_TIMEOUT,
                    "handler_timeout",
                    "Handler execution timed out",
                )
            });

        Ok(response)
    }

    /// Routes a cached-body request through the pipeline and the handler.
    async fn dispatch(&self, request: Request<CachedBody>) -> HttpResponse {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let Some(route_match) = self.router.match_route(&method, &path) else {
            return HttpResponse::json_error(
                StatusCode::NOT_FOUND,
                "route_not_found",
                &format!("No route for {method} {path}"),
            );
        };

        let operation_id = route_match.operation_id().to_string();

        let Some(handler) = self.handlers.get(&operation_id) else {
            tracing::warn!("No handler registered for operation: {}", operation_id);
            return HttpResponse::json_error(
                StatusCode::NOT_IMPLEMENTED,
                "handler_not_implemented",
                &format!("No handler registered for operation: {operation_id}"),
            );
        };

        let mut ctx = self.intercept_context(route_match.markers(), &operation_id);

        self.pipeline
            .process(&mut ctx, request, move |ctx, request| {
                let request_ctx = ctx.to_request_context();
                let invocation = handler.call(request_ctx, request);
                Box::pin(async move {
                    match invocation.await {
                        Ok(response) => response,
                        Err(err) => {
                            tracing::error!(error = %err, "handler failed");
                            HttpResponse::json_error(err.status_code(), err.code(), &err.to_string())
                        }
                    }
                })
            })
            .await
    }

    /// Builds the pipeline context for one request.
    fn intercept_context(&self, markers: RouteMarkers, operation_id: &str) -> InterceptContext {
        let mut ctx = InterceptContext::new(markers);
        ctx.set_operation_id(operation_id);
        if let Some(source) = &self.span_source {
            if let Some(span) = source.current_span() {
                ctx.set_span(span);
            }
        }
        ctx
    }
}

/// Builder for configuring and creating a [`Server`].
pub struct ServerBuilder {
    config_builder: crate::config::ServerConfigBuilder,
    resolver: Arc<dyn MerchantResolver>,
    router: Router,
    handlers: HandlerRegistry,
    pipeline: Option<InterceptPipeline>,
    span_source: Option<Arc<dyn SpanSource>>,
}

impl ServerBuilder {
    /// Creates a new server builder around a credential resolver.
    #[must_use]
    pub fn new(resolver: Arc<dyn MerchantResolver>) -> Self {
        Self {
            config_builder: crate::config::ServerConfigBuilder::new(),
            resolver,
            router: Router::new(),
            handlers: HandlerRegistry::new(),
            pipeline: None,
            span_source: None,
        }
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.http_addr(addr);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.request_timeout(timeout);
        self
    }

    /// Sets the router.
    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// Sets the handler registry.
    #[must_use]
    pub fn handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Replaces the standard pipeline with a custom one.
    #[must_use]
    pub fn pipeline(mut self, pipeline: InterceptPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Sets the span source used for telemetry decoration.
    #[must_use]
    pub fn span_source(mut self, source: Arc<dyn SpanSource>) -> Self {
        self.span_source = Some(source);
        self
    }

    /// Builds the server with the configured settings.
    #[must_use]
    pub fn build(self) -> Server {
        let pipeline = self
            .pipeline
            .unwrap_or_else(|| InterceptPipeline::standard(Arc::clone(&self.resolver)));

        Server {
            config: self.config_builder.build(),
            router: self.router,
            handlers: self.handlers,
            pipeline,
            span_source: self.span_source,
        }
    }
}
