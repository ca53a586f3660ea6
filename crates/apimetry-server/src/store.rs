//! In-memory merchant and order store.
//!
//! Backs the reference endpoints: merchants are created with a generated
//! credential token, and the store doubles as the
//! [`MerchantResolver`] used by the auth gate. Intended for demos and tests,
//! not durable storage.

use apimetry_core::{BoxFuture, MerchantIdentity, MerchantResolver};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An order placed by a merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier.
    pub id: i64,

    /// Owning merchant.
    pub merchant_id: i64,

    /// Order amount in cents.
    pub amount_cents: i64,

    /// Free-form description.
    pub description: String,
}

#[derive(Debug, Default)]
struct StoreInner {
    merchants: Vec<MerchantIdentity>,
    orders: Vec<Order>,
    next_merchant_id: i64,
    next_order_id: i64,
}

/// Thread-safe in-memory store for merchants and their orders.
///
/// # Example
///
/// ```
/// use apimetry_server::MerchantStore;
///
/// let store = MerchantStore::new();
/// let merchant = store.create_merchant("Acme");
/// assert_eq!(store.find_merchant_by_token(&merchant.auth_token), Some(merchant));
/// ```
#[derive(Debug, Default)]
pub struct MerchantStore {
    inner: RwLock<StoreInner>,
}

impl MerchantStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                merchants: Vec::new(),
                orders: Vec::new(),
                next_merchant_id: 1,
                next_order_id: 1,
            }),
        }
    }

    /// Creates a merchant with a freshly generated credential token.
    pub fn create_merchant(&self, name: impl Into<String>) -> MerchantIdentity {
        let mut inner = self.inner.write();
        let id = inner.next_merchant_id;
        inner.next_merchant_id += 1;

        let merchant = MerchantIdentity::new(id, name, Uuid::new_v4().to_string());
        inner.merchants.push(merchant.clone());
        merchant
    }

    /// Inserts a merchant with a known identity. Used for seeding.
    pub fn insert_merchant(&self, merchant: MerchantIdentity) {
        let mut inner = self.inner.write();
        inner.next_merchant_id = inner.next_merchant_id.max(merchant.id + 1);
        inner.merchants.push(merchant);
    }

    /// Looks up a merchant by credential token.
    #[must_use]
    pub fn find_merchant_by_token(&self, token: &str) -> Option<MerchantIdentity> {
        self.inner
            .read()
            .merchants
            .iter()
            .find(|m| m.auth_token == token)
            .cloned()
    }

    /// Records an order for a merchant.
    pub fn add_order(
        &self,
        merchant_id: i64,
        amount_cents: i64,
        description: impl Into<String>,
    ) -> Order {
        let mut inner = self.inner.write();
        let id = inner.next_order_id;
        inner.next_order_id += 1;

        let order = Order {
            id,
            merchant_id,
            amount_cents,
            description: description.into(),
        };
        inner.orders.push(order.clone());
        order
    }

    /// Returns all orders belonging to a merchant.
    #[must_use]
    pub fn orders_for(&self, merchant_id: i64) -> Vec<Order> {
        self.inner
            .read()
            .orders
            .iter()
            .filter(|o| o.merchant_id == merchant_id)
            .cloned()
            .collect()
    }

    /// Returns the number of merchants in the store.
    #[must_use]
    pub fn merchant_count(&self) -> usize {
        self.inner.read().merchants.len()
    }
}

impl MerchantResolver for MerchantStore {
    fn find_by_token<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Option<MerchantIdentity>> {
        let merchant = self.find_merchant_by_token(token);
        Box::pin(async move { merchant })
    }
}
