//! Seam to the tracing SDK.
//!
//! The pipeline does not look up a thread-local "current span"; the server
//! resolves an optional [`SpanHandle`] once per request via a [`SpanSource`]
//! and threads it through the context. The no-span path is an explicit,
//! testable branch: absence of a handle means decoration silently no-ops.

use std::sync::Arc;

/// A span attribute value.
///
/// The tracing stage only ever attaches integers (merchant id) and strings
/// (merchant name, body text), so the surface is deliberately small.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// A 64-bit integer attribute.
    I64(i64),
    /// A string attribute.
    Str(String),
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::I64(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
        }
    }
}

/// Handle to the active span of one request.
///
/// Implementations must be safe to call from the request's flow of control;
/// the underlying SDK owns any cross-thread synchronization.
pub trait SpanHandle: Send + Sync + std::fmt::Debug {
    /// Attaches a key/value attribute to the span.
    fn set_attribute(&self, key: &str, value: AttributeValue);
}

/// A shared, clonable span handle.
pub type SharedSpan = Arc<dyn SpanHandle>;

/// Resolves the active span for an incoming request, if tracing is enabled.
pub trait SpanSource: Send + Sync {
    /// Returns the active span handle, or `None` when tracing is disabled
    /// or no span is recording.
    fn current_span(&self) -> Option<SharedSpan>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::RecordingSpan;

    #[test]
    fn test_attribute_value_conversions() {
        assert_eq!(AttributeValue::from(7), AttributeValue::I64(7));
        assert_eq!(
            AttributeValue::from("Acme"),
            AttributeValue::Str("Acme".to_string())
        );
    }

    #[test]
    fn test_recording_span_captures_attributes() {
        let span = RecordingSpan::default();
        span.set_attribute("apimetry.customer.id", 7.into());
        span.set_attribute("apimetry.customer.name", "Acme".into());

        let attrs = span.attributes();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].0, "apimetry.customer.id");
        assert_eq!(attrs[1].1, AttributeValue::Str("Acme".to_string()));
    }
}
