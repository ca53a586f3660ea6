//! Seam to the identity store.
//!
//! The interception pipeline never talks to storage directly; it consumes a
//! [`MerchantResolver`]. The reference in-memory store lives in
//! `apimetry-server`, production deployments plug in their own.

use crate::identity::MerchantIdentity;
use std::future::Future;
use std::pin::Pin;

/// A boxed future, used at trait seams that must stay object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Maps an opaque credential token to a merchant identity.
///
/// Returns `None` when the token is unknown; the auth stage treats a lookup
/// miss exactly like a missing credential on a protected route. The resolver
/// is responsible for its own thread-safety.
///
/// # Example
///
/// ```
/// use apimetry_core::{BoxFuture, MerchantIdentity, MerchantResolver};
///
/// struct DenyAll;
///
/// impl MerchantResolver for DenyAll {
///     fn find_by_token<'a>(&'a self, _token: &'a str) -> BoxFuture<'a, Option<MerchantIdentity>> {
///         Box::pin(async { None })
///     }
/// }
/// ```
pub trait MerchantResolver: Send + Sync {
    /// Looks up the identity behind a credential token.
    fn find_by_token<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Option<MerchantIdentity>>;
}
