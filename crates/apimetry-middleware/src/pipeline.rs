//! Fixed-order interception pipeline.
//!
//! Body caching is installed before the pipeline runs (the request type
//! carries the cache), then AuthGate, TelemetryDecorator, and finally the
//! handler. A rejection from the auth gate
//! terminates the chain; every other outcome reaches the handler, which may
//! consume the cached body freely.

use crate::context::InterceptContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::stages::{AuthGate, TelemetryDecorator};
use crate::types::{Request, Response};
use apimetry_core::MerchantResolver;
use std::sync::Arc;

/// A type-erased stage that can be stored in the pipeline.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The fixed-order interception pipeline.
///
/// # Example
///
/// ```
/// use apimetry_core::fixtures::FixedResolver;
/// use apimetry_middleware::pipeline::InterceptPipeline;
/// use std::sync::Arc;
///
/// let pipeline = InterceptPipeline::standard(Arc::new(FixedResolver::default()));
/// assert_eq!(pipeline.stage_names(), vec!["auth", "telemetry"]);
/// ```
pub struct InterceptPipeline {
    /// Pre-handler stages in execution order.
    stages: Vec<BoxedMiddleware>,
}

impl InterceptPipeline {
    /// Creates the standard pipeline: auth gate, then telemetry decoration.
    #[must_use]
    pub fn standard(resolver: Arc<dyn MerchantResolver>) -> Self {
        Self::builder()
            .add_stage(AuthGate::new(resolver))
            .add_stage(TelemetryDecorator::new())
            .build()
    }

    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> InterceptPipelineBuilder {
        InterceptPipelineBuilder::new()
    }

    /// Processes a request through the pipeline and into the handler.
    pub async fn process<H>(
        &self,
        ctx: &mut InterceptContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut InterceptContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(ctx, request).await
    }

    /// Builds the stage chain for one request, handler-terminal.
    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut InterceptContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for stage in self.stages.iter().rev() {
            next = Next::new(stage.as_ref(), next);
        }
        next
    }

    /// Returns the names of all stages in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

/// Builder for an [`InterceptPipeline`].
#[derive(Default)]
pub struct InterceptPipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl InterceptPipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage. Order of calls is order of execution.
    #[must_use]
    pub fn add_stage<M: Middleware>(mut self, stage: M) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Builds the pipeline. The stage order is fixed from here on.
    #[must_use]
    pub fn build(self) -> InterceptPipeline {
        InterceptPipeline {
            stages: self.stages,
        }
    }
}

/// The fixed order of interception stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Stage 1: credential resolution, 403 short-circuit on failure.
    Auth = 1,
    /// Stage 2: span attribute decoration.
    Telemetry = 2,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Telemetry => "telemetry",
        }
    }

    /// Returns all stages in execution order.
    #[must_use]
    pub const fn all() -> [Stage; 2] {
        [Self::Auth, Self::Telemetry]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::CachedBody;
    use apimetry_core::RouteMarkers;
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::Full;
    use std::sync::Mutex;

    struct OrderTrackingStage {
        name: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for OrderTrackingStage {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut InterceptContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            let order = self.order.clone();
            let name = self.name;
            Box::pin(async move {
                order.lock().unwrap().push(name);
                next.run(ctx, request).await
            })
        }
    }

    fn test_request() -> Request {
        HttpRequest::builder()
            .uri("/test")
            .body(CachedBody::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_pipeline_executes_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));

        let pipeline = InterceptPipeline::builder()
            .add_stage(OrderTrackingStage {
                name: "first",
                order: order.clone(),
            })
            .add_stage(OrderTrackingStage {
                name: "second",
                order: order.clone(),
            })
            .build();

        let mut ctx = InterceptContext::new(RouteMarkers::new());
        let response = pipeline
            .process(&mut ctx, test_request(), |_ctx, _req| {
                Box::pin(async {
                    HttpResponse::builder()
                        .status(StatusCode::OK)
                        .body(Full::new(Bytes::from("OK")))
                        .unwrap()
                })
            })
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_empty_pipeline_reaches_handler() {
        let pipeline = InterceptPipeline::builder().build();
        let mut ctx = InterceptContext::new(RouteMarkers::new());

        let response = pipeline
            .process(&mut ctx, test_request(), |_ctx, _req| {
                Box::pin(async {
                    HttpResponse::builder()
                        .status(StatusCode::OK)
                        .body(Full::new(Bytes::from("handler")))
                        .unwrap()
                })
            })
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(pipeline.stage_count(), 0);
    }

    #[test]
    fn test_standard_pipeline_order() {
        let pipeline = InterceptPipeline::standard(Arc::new(
            apimetry_core::fixtures::FixedResolver::default(),
        ));
        assert_eq!(pipeline.stage_names(), vec!["auth", "telemetry"]);
    }

    #[test]
    fn test_stage_ordering() {
        assert!(Stage::Auth < Stage::Telemetry);
        assert_eq!(Stage::all().map(Stage::name), ["auth", "telemetry"]);
    }
}
