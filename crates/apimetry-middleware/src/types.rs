//! Common types used throughout the interception pipeline.

use crate::body::CachedBody;
use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type used in the interception pipeline.
///
/// The body slot holds the [`CachedBody`] decorator, so every stage and the
/// downstream handler see the same re-readable body.
pub type Request = http::Request<CachedBody>;

/// The HTTP response type used in the interception pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building error responses.
pub trait ResponseExt {
    /// Creates a JSON error response with a stable error code.
    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response;
}

impl ResponseExt for Response {
    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });

        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap_or_else(|_| http::Response::new(Full::new(Bytes::new())))
    }
}
