//! Error types for Apimetry.
//!
//! [`ApimetryError`] is the standard error type used throughout the
//! interception layer. Errors carry a category that maps to an HTTP status
//! code; only authorization failures and body read failures ever affect the
//! caller-visible outcome, everything telemetry-related is absorbed locally.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ApimetryError`].
pub type ApimetryResult<T> = Result<T, ApimetryError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Authorization failures (missing/blank/unknown credential).
    Authorization,
    /// Request body could not be buffered.
    BodyRead,
    /// Request validation errors (malformed input).
    Validation,
    /// Resource not found.
    NotFound,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::BodyRead | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// Standard error type for Apimetry.
///
/// # Example
///
/// ```
/// use apimetry_core::ApimetryError;
/// use http::StatusCode;
///
/// let err = ApimetryError::authorization("credential not recognized");
/// assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
/// ```
#[derive(Error, Debug)]
pub enum ApimetryError {
    /// The caller could not be authorized.
    ///
    /// Missing or blank credential on a protected route, or a credential the
    /// resolver does not recognize. Fatal to the current request only; never
    /// retried.
    #[error("Authorization failed: {message}")]
    Authorization {
        /// Human-readable error message.
        message: String,
    },

    /// The request body could not be buffered.
    ///
    /// Raised on the first (and only) drain of the underlying source. The
    /// body cache stays unpopulated, so the failure is diagnosable rather
    /// than silently truncated.
    #[error("Body read failed: {message}")]
    BodyRead {
        /// Human-readable error message.
        message: String,
    },

    /// Request validation failed.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ApimetryError {
    /// Creates an authorization error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Creates a body-read error.
    #[must_use]
    pub fn body_read(message: impl Into<String>) -> Self {
        Self::BodyRead {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with an underlying cause.
    #[must_use]
    pub fn internal_with_source(message: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::BodyRead { .. } => ErrorCategory::BodyRead,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns a stable machine-readable error code for response envelopes.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Authorization { .. } => "authorization_failed",
            Self::BodyRead { .. } => "body_read_failed",
            Self::Validation { .. } => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::Internal { .. } => "internal_error",
        }
    }
}
