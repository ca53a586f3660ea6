//! Built-in interception stages.
//!
//! The pipeline runs these in a fixed order:
//!
//! 1. [`AuthGate`](auth::AuthGate) - credential resolution and rejection
//! 2. [`TelemetryDecorator`](telemetry::TelemetryDecorator) - span attributes

pub mod auth;
pub mod telemetry;

pub use auth::AuthGate;
pub use telemetry::TelemetryDecorator;
