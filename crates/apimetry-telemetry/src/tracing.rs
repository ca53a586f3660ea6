//! OpenTelemetry distributed tracing for Apimetry.
//!
//! Provides OTLP export, W3C trace context propagation, and the adapter that
//! exposes the current OpenTelemetry span through the
//! [`SpanSource`](apimetry_core::SpanSource) seam used by the interception
//! pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use apimetry_telemetry::tracing::{TracingConfig, init_tracing};
//!
//! let config = TracingConfig::default();
//! let provider = init_tracing(&config)?;
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use apimetry_core::{AttributeValue, SharedSpan, SpanHandle, SpanSource};
use opentelemetry::trace::TraceContextExt;
use opentelemetry::{global, Context, Key, KeyValue, Value};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler, TracerProvider};
use opentelemetry_sdk::Resource;
use std::sync::Arc;

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Whether tracing is enabled.
    pub enabled: bool,

    /// OTLP endpoint (e.g., `http://localhost:4317`).
    pub otlp_endpoint: String,

    /// Service name for spans.
    pub service_name: String,

    /// Service version.
    pub service_version: String,

    /// Deployment environment.
    pub environment: String,

    /// Sampling ratio (0.0 to 1.0).
    pub sample_ratio: f64,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            otlp_endpoint: "http://localhost:4317".to_string(),
            service_name: "apimetry".to_string(),
            service_version: "0.1.0".to_string(),
            environment: "development".to_string(),
            sample_ratio: 1.0, // Sample all traces by default in dev
        }
    }
}

impl TracingConfig {
    /// Creates a production configuration with lower sampling.
    #[must_use]
    pub fn production(service_name: &str, version: &str) -> Self {
        Self {
            enabled: true,
            otlp_endpoint: "http://localhost:4317".to_string(),
            service_name: service_name.to_string(),
            service_version: version.to_string(),
            environment: "production".to_string(),
            sample_ratio: 0.1, // Sample 10% in production
        }
    }
}

/// Initializes the tracing subsystem.
///
/// Returns the `TracerProvider` for later shutdown, or `None` when tracing
/// is disabled.
///
/// # Errors
///
/// Returns `TelemetryError::TracingInit` if the exporter cannot be built.
pub fn init_tracing(config: &TracingConfig) -> TelemetryResult<Option<TracerProvider>> {
    if !config.enabled {
        return Ok(None);
    }

    let resource = Resource::new([
        KeyValue::new(
            opentelemetry_semantic_conventions::attribute::SERVICE_NAME,
            config.service_name.clone(),
        ),
        KeyValue::new(
            opentelemetry_semantic_conventions::attribute::SERVICE_VERSION,
            config.service_version.clone(),
        ),
        KeyValue::new("deployment.environment", config.environment.clone()),
    ]);

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()
        .map_err(|e| TelemetryError::TracingInit(e.to_string()))?;

    let sampler = if config.sample_ratio >= 1.0 {
        Sampler::AlwaysOn
    } else if config.sample_ratio <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(config.sample_ratio)
    };

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_sampler(sampler)
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .build();

    global::set_tracer_provider(provider.clone());

    Ok(Some(provider))
}

/// Shuts down the tracing subsystem gracefully.
pub fn shutdown_tracing() {
    global::shutdown_tracer_provider();
}

/// A [`SpanHandle`] over a captured OpenTelemetry context.
///
/// Attribute writes go to the span active in that context. Dropping the
/// handle does not end the span.
#[derive(Debug)]
pub struct OtelSpan {
    context: Context,
}

impl OtelSpan {
    /// Wraps the span active in the given context.
    #[must_use]
    pub fn new(context: Context) -> Self {
        Self { context }
    }
}

impl SpanHandle for OtelSpan {
    fn set_attribute(&self, key: &str, value: AttributeValue) {
        let value = match value {
            AttributeValue::I64(i) => Value::I64(i),
            AttributeValue::Str(s) => Value::String(s.into()),
        };
        self.context
            .span()
            .set_attribute(KeyValue::new(Key::new(key.to_string()), value));
    }
}

/// A [`SpanSource`] backed by the ambient OpenTelemetry context.
///
/// Yields a handle only when a span is actually active, so decoration
/// degrades to a no-op when tracing is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct OtelSpanSource;

impl OtelSpanSource {
    /// Creates a new span source.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SpanSource for OtelSpanSource {
    fn current_span(&self) -> Option<SharedSpan> {
        let cx = Context::current();
        if cx.has_active_span() {
            Some(Arc::new(OtelSpan::new(cx)) as SharedSpan)
        } else {
            None
        }
    }
}

/// Extracts trace context from incoming HTTP headers.
pub fn extract_context<T: opentelemetry::propagation::Extractor>(headers: &T) -> Context {
    global::get_text_map_propagator(|propagator| propagator.extract(headers))
}

/// HTTP header extractor for `http::HeaderMap`.
pub struct HeaderExtractor<'a>(pub &'a http::HeaderMap);

impl opentelemetry::propagation::Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(http::HeaderName::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::propagation::Extractor;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.sample_ratio, 1.0);
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_production_config() {
        let config = TracingConfig::production("merchants-api", "1.0.0");
        assert_eq!(config.sample_ratio, 0.1);
        assert_eq!(config.environment, "production");
        assert_eq!(config.service_name, "merchants-api");
    }

    #[test]
    fn test_header_extractor() {
        let mut headers = http::HeaderMap::new();
        headers.insert("traceparent", "test-value".parse().unwrap());

        let extractor = HeaderExtractor(&headers);
        assert_eq!(extractor.get("traceparent"), Some("test-value"));
        assert!(extractor.get("nonexistent").is_none());
    }

    #[test]
    fn test_disabled_tracing() {
        let config = TracingConfig {
            enabled: false,
            ..Default::default()
        };

        let result = init_tracing(&config);
        assert!(result.is_ok());
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_span_source_without_active_span() {
        // No span has been started on this thread.
        assert!(OtelSpanSource::new().current_span().is_none());
    }
}
