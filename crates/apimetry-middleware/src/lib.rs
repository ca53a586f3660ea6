//! # Apimetry Middleware
//!
//! The interception pipeline for Apimetry.
//!
//! Every request flows through a fixed-order chain:
//!
//! ```text
//! Request ──▶ [body cache installed] ──▶ Auth ──▶ Telemetry ──▶ Handler
//!                                          │
//!                                          └── 403 (handler never invoked)
//! ```
//!
//! - The request body is wrapped in a [`CachedBody`](body::CachedBody)
//!   before the pipeline runs, so every stage and the handler see a
//!   re-readable body while the transport stream is drained at most once.
//! - The [`AuthGate`](stages::AuthGate) resolves the `Authorization` header
//!   through a [`MerchantResolver`](apimetry_core::MerchantResolver) and
//!   short-circuits with 403 when the route requires authentication.
//! - The [`TelemetryDecorator`](stages::TelemetryDecorator) attaches
//!   merchant and body attributes to the active span, honoring the
//!   per-route [`RouteMarkers`](apimetry_core::RouteMarkers).
//!
//! Stage ordering is a correctness requirement, so the chain is wired by
//! [`InterceptPipeline::standard`](pipeline::InterceptPipeline::standard)
//! rather than assembled ad hoc.

#![doc(html_root_url = "https://docs.rs/apimetry-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod body;
pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use body::{BodyError, CachedBody};
pub use context::InterceptContext;
pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{InterceptPipeline, InterceptPipelineBuilder, Stage};
pub use types::{Request, Response, ResponseExt};
