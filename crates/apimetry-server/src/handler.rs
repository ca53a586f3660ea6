//! Handler registration and dispatch.
//!
//! Handlers are keyed by operation ID and receive the immutable
//! [`RequestContext`] produced by the interception pipeline plus the
//! cached-body request. Errors are [`ApimetryError`]s, converted by the
//! server into JSON error envelopes.
//!
//! # Example
//!
//! ```rust,ignore
//! use apimetry_server::HandlerRegistry;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("findOrders", |ctx, _req| {
//!     Box::pin(async move {
//!         let merchant_id = ctx
//!             .merchant_id()
//!             .ok_or_else(|| ApimetryError::authorization("no merchant resolved"))?;
//!         // ...
//!     })
//! });
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use apimetry_core::{ApimetryError, BoxFuture, RequestContext};
use apimetry_middleware::{Request, Response};

/// Outcome of a handler invocation.
pub type HandlerResult = Result<Response, ApimetryError>;

/// A registered operation handler.
pub trait Handler: Send + Sync {
    /// Invokes the handler with the request context and cached-body request.
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, HandlerResult>;
}

impl<F> Handler for F
where
    F: Fn(RequestContext, Request) -> BoxFuture<'static, HandlerResult> + Send + Sync,
{
    fn call(&self, ctx: RequestContext, request: Request) -> BoxFuture<'static, HandlerResult> {
        self(ctx, request)
    }
}

/// Registry of operation handlers, keyed by operation ID.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers a handler for an operation ID.
    ///
    /// Replaces any previously registered handler for the same operation.
    pub fn register<H>(&mut self, operation_id: impl Into<String>, handler: H)
    where
        H: Handler + 'static,
    {
        self.handlers.insert(operation_id.into(), Arc::new(handler));
    }

    /// Returns whether a handler is registered for the operation.
    #[must_use]
    pub fn contains(&self, operation_id: &str) -> bool {
        self.handlers.contains_key(operation_id)
    }

    /// Returns the handler for an operation, if registered.
    #[must_use]
    pub fn get(&self, operation_id: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(operation_id).cloned()
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("operations", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
