//! HTTP server integration for the Apimetry interception pipeline.
//!
//! This crate turns the pipeline into a runnable service:
//!
//! - [`Router`] maps method + path to an operation ID and carries the
//!   per-route [`RouteMarkers`](apimetry_core::RouteMarkers) declared at
//!   registration.
//! - [`HandlerRegistry`] holds operation handlers keyed by operation ID.
//! - [`Server`] accepts connections with hyper, collects each request body
//!   into the re-readable cache, and runs the standard pipeline in front of
//!   the matched handler.
//! - [`MerchantStore`] is an in-memory merchant/order store that doubles as
//!   the credential resolver for demos and tests.

#![warn(missing_docs)]

pub mod config;
pub mod handler;
pub mod router;
pub mod server;
pub mod store;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use handler::{Handler, HandlerRegistry, HandlerResult};
pub use router::{RouteMatch, Router};
pub use server::{HttpResponse, Server, ServerBuilder, ServerError};
pub use store::{MerchantStore, Order};
