//! Reusable test fixtures.
//!
//! Shared across the workspace's test suites: a span double that records
//! attributes instead of exporting them, and a resolver backed by a fixed
//! token table. Compiled into the crate (not behind `cfg(test)`) so sibling
//! crates can use them in their own tests.

use crate::identity::MerchantIdentity;
use crate::resolver::{BoxFuture, MerchantResolver};
use crate::span::{AttributeValue, SpanHandle};
use std::collections::HashMap;
use std::sync::Mutex;

/// A [`SpanHandle`] that records attributes in memory, in call order.
///
/// # Example
///
/// ```
/// use apimetry_core::fixtures::RecordingSpan;
/// use apimetry_core::SpanHandle;
///
/// let span = RecordingSpan::default();
/// span.set_attribute("apimetry.customer.id", 7.into());
/// assert_eq!(span.attributes().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingSpan {
    attributes: Mutex<Vec<(String, AttributeValue)>>,
}

impl RecordingSpan {
    /// Returns a snapshot of the recorded attributes, in the order set.
    #[must_use]
    pub fn attributes(&self) -> Vec<(String, AttributeValue)> {
        self.attributes.lock().expect("fixture lock poisoned").clone()
    }

    /// Returns the recorded value for a key, if any.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<AttributeValue> {
        self.attributes()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl SpanHandle for RecordingSpan {
    fn set_attribute(&self, key: &str, value: AttributeValue) {
        self.attributes
            .lock()
            .expect("fixture lock poisoned")
            .push((key.to_string(), value));
    }
}

/// A [`MerchantResolver`] backed by a fixed token table.
#[derive(Debug, Default)]
pub struct FixedResolver {
    merchants: HashMap<String, MerchantIdentity>,
}

impl FixedResolver {
    /// Adds a merchant, keyed by its auth token.
    #[must_use]
    pub fn with_merchant(mut self, merchant: MerchantIdentity) -> Self {
        self.merchants.insert(merchant.auth_token.clone(), merchant);
        self
    }
}

impl MerchantResolver for FixedResolver {
    fn find_by_token<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Option<MerchantIdentity>> {
        Box::pin(async move { self.merchants.get(token).cloned() })
    }
}
