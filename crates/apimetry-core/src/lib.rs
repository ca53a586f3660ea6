//! # Apimetry Core
//!
//! Core types and traits for the Apimetry request-interception layer.
//!
//! This crate provides the foundational types used throughout Apimetry:
//!
//! - [`RequestContext`] - Per-request context carrying identity and route markers
//! - [`RequestId`] - UUID v7 request identifier
//! - [`MerchantIdentity`] - Resolved tenant identity (id, name, auth token)
//! - [`RouteMarkers`] - Per-endpoint auth/telemetry markers
//! - [`MerchantResolver`] - Seam to the identity store
//! - [`SpanHandle`] / [`SpanSource`] - Seam to the tracing SDK
//! - [`ApimetryError`] - Standard error types

#![doc(html_root_url = "https://docs.rs/apimetry-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
pub mod fixtures;
mod identity;
mod markers;
mod resolver;
mod span;

pub use context::{RequestContext, RequestId};
pub use error::{ApimetryError, ApimetryResult, ErrorCategory};
pub use identity::MerchantIdentity;
pub use markers::RouteMarkers;
pub use resolver::{BoxFuture, MerchantResolver};
pub use span::{AttributeValue, SharedSpan, SpanHandle, SpanSource};
