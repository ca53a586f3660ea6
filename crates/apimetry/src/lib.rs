//! # Apimetry
//!
//! **Request interception with per-merchant telemetry for HTTP services**
//!
//! Apimetry sits in front of request handlers and provides:
//!
//! - **Re-readable bodies** - the request body is buffered once and served
//!   from a cache, so telemetry capture never starves the handler
//! - **Credential gating** - `Authorization` tokens are resolved to merchant
//!   identities, with per-route opt-out for public endpoints
//! - **Span decoration** - resolved identity and body text are attached to
//!   the active trace span as `apimetry.customer.id`,
//!   `apimetry.customer.name` and `http.body` attributes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use apimetry::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MerchantStore::new());
//!
//!     let server = Server::builder(store)
//!         .http_addr("0.0.0.0:8080")
//!         .build();
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Every request flows through a fixed-order pipeline:
//!
//! ```text
//! Request → [body cached] → Auth → Telemetry → Handler
//!                             │
//!                             └── 403 (handler never invoked)
//! ```

#![doc(html_root_url = "https://docs.rs/apimetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use apimetry_core as core;

// Re-export middleware types
pub use apimetry_middleware as middleware;

// Re-export telemetry types
pub use apimetry_telemetry as telemetry;

// Re-export server types
pub use apimetry_server as server;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use apimetry::prelude::*;
/// ```
pub mod prelude {
    pub use apimetry_core::{
        ApimetryError, MerchantIdentity, MerchantResolver, RequestContext, RequestId,
        RouteMarkers,
    };
    pub use apimetry_middleware::{
        CachedBody, InterceptContext, InterceptPipeline, Request, Response, ResponseExt,
    };
    pub use apimetry_server::{
        HandlerRegistry, MerchantStore, Router, Server, ServerConfig,
    };
    pub use apimetry_telemetry::{init_telemetry, OtelSpanSource, TelemetryConfig};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_prelude_exports() {
        use crate::prelude::*;

        let merchant = MerchantIdentity::new(7, "Acme", "tok-123");
        assert_eq!(merchant.id, 7);

        let markers = RouteMarkers::new().no_auth();
        assert!(markers.no_auth);
    }
}
