//! Core middleware trait and chain types.
//!
//! This module defines the [`Middleware`] trait the interception stages
//! implement, and the consuming [`Next`] callback that links them into a
//! chain ending at the handler. The pipeline order is fixed (auth before
//! telemetry before handler — sequencing is a correctness requirement), so
//! stages are wired by [`InterceptPipeline`](crate::pipeline::InterceptPipeline)
//! rather than by users.

use crate::context::InterceptContext;
use crate::types::{Request, Response};
use std::future::Future;
use std::pin::Pin;

/// A boxed future that returns a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single interception stage.
///
/// Stages receive a mutable context, the request (carrying the re-readable
/// body), and a [`Next`] callback for the rest of the chain.
///
/// # Invariants
///
/// - A stage MUST call `next.run()` exactly once, unless it short-circuits
///   with its own response (the auth gate's rejection path).
/// - A stage MUST read the request body through [`CachedBody`](crate::body::CachedBody),
///   never by draining the transport directly.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this stage, used for logging.
    fn name(&self) -> &'static str;

    /// Processes the request through this stage.
    fn process<'a>(
        &'a self,
        ctx: &'a mut InterceptContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// Callback to invoke the rest of the chain.
///
/// Consumed by `run`, so a stage can only continue the chain once. Not
/// calling it short-circuits the pipeline with the stage's own response.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More stages to process.
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain: invoke the handler.
    Handler(
        Box<dyn FnOnce(&mut InterceptContext, Request) -> BoxFuture<'static, Response> + Send + 'a>,
    ),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke the given stage.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut InterceptContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next stage or the handler.
    pub async fn run(self, ctx: &mut InterceptContext, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}
