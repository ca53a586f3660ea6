//! Resolved tenant identity.
//!
//! A [`MerchantIdentity`] is produced by a [`MerchantResolver`](crate::MerchantResolver)
//! on a successful credential lookup. It is immutable for the lifetime of a
//! request: the auth stage owns it briefly, then hands it by reference to the
//! telemetry stage and the downstream handler.

use serde::{Deserialize, Serialize};

/// The resolved identity of an authenticated caller.
///
/// # Example
///
/// ```
/// use apimetry_core::MerchantIdentity;
///
/// let merchant = MerchantIdentity::new(7, "Acme", "tok-123");
/// assert_eq!(merchant.id, 7);
/// assert_eq!(merchant.name, "Acme");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantIdentity {
    /// Numeric merchant identifier.
    pub id: i64,

    /// Display name of the merchant.
    pub name: String,

    /// The opaque credential token this identity was resolved from.
    ///
    /// Never attached to spans or logs.
    pub auth_token: String,
}

impl MerchantIdentity {
    /// Creates a new merchant identity.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            auth_token: auth_token.into(),
        }
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// This never includes the auth token.
    #[must_use]
    pub fn log_id(&self) -> String {
        format!("merchant:{}", self.id)
    }
}
