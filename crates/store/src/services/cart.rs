//! Shopping cart.
//!
//! The cart is an ordered list of [`CartLine`]s, one per product, in the
//! order products were first added. Totals are always recomputed from the
//! lines so they cannot drift.

use tracing::{debug, instrument};

use bazaar_core::{Price, ProductId};

use crate::db::{KeyValueStore, RepositoryError, get_json, set_json};
use crate::models::cart::{CartLine, CartSummary, CartTotals, ShippingPolicy};
use crate::models::product::Product;
use crate::models::session::keys;

/// Line items of one shopper's cart.
///
/// Never persists on its own; call [`CartStore::persist`] after mutating.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartStore {
    lines: Vec<CartLine>,
}

impl CartStore {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from stored lines.
    ///
    /// Zero-quantity lines are dropped and repeated products are merged into
    /// their first line.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            match cart.position(line.product_id) {
                Some(index) => {
                    if let Some(existing) = cart.lines.get_mut(index) {
                        existing.quantity = existing.quantity.saturating_add(line.quantity);
                    }
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }

    /// Add `quantity` units of `product`.
    ///
    /// Increments the existing line if the product is already in the cart.
    /// A quantity of zero is ignored.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            debug!("ignoring add of zero units");
            return;
        }
        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            debug!(quantity = line.quantity, "incremented cart line");
        } else {
            self.lines.push(CartLine::from_product(product, quantity));
            debug!(quantity, "added cart line");
        }
    }

    /// Set the quantity of a line. Zero or less removes it.
    ///
    /// Does nothing if the product is not in the cart.
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.line_mut(product_id) {
            Some(line) => line.quantity = quantity,
            None => debug!("product not in cart"),
        }
    }

    /// Remove the line for `product_id`, if any.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, product_id: ProductId) {
        match self.position(product_id) {
            Some(index) => {
                self.lines.remove(index);
            }
            None => debug!("product not in cart"),
        }
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Current lines, in the order they were added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity of `product_id` in the cart, zero if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
            .map_or(0, |line| line.quantity)
    }

    /// Item count and price, computed from the current lines.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            total_items: self.lines.iter().map(|line| u64::from(line.quantity)).sum(),
            total_price: self.lines.iter().map(CartLine::line_total).sum::<Price>(),
        }
    }

    /// Totals plus shipping under `policy`.
    #[must_use]
    pub fn summary(&self, policy: &ShippingPolicy) -> CartSummary {
        CartSummary::new(self.totals(), policy)
    }

    /// Restore the cart saved under the `cart` key, or an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored value is not a
    /// list of cart lines.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, RepositoryError> {
        let lines: Option<Vec<CartLine>> = get_json(store, keys::CART)?;
        Ok(lines.map(Self::from_lines).unwrap_or_default())
    }

    /// Save the cart under the `cart` key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be written.
    pub fn persist(&self, store: &dyn KeyValueStore) -> Result<(), RepositoryError> {
        set_json(store, keys::CART, &self.lines)
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn product(id: i32, rupees: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::inr(rupees),
            image: format!("https://img.test/{id}.jpg"),
            images: Vec::new(),
            description: String::new(),
            category: "Electronics".to_owned(),
            rating: 4.5,
            reviews: 10,
            in_stock: true,
        }
    }

    #[test]
    fn test_add_same_product_merges() {
        let mut cart = CartStore::new();
        let p = product(1, 100);
        cart.add_item(&p, 2);
        cart.add_item(&p, 3);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(p.id), 5);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 100), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = CartStore::new();
        cart.add_item(&product(3, 10), 1);
        cart.add_item(&product(1, 10), 1);
        cart.add_item(&product(3, 10), 1);
        let ids: Vec<i32> = cart.lines().iter().map(|l| l.product_id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 100), 2);
        cart.add_item(&product(2, 50), 1);
        cart.update_quantity(ProductId::new(1), 0);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(
            cart.totals(),
            CartTotals {
                total_items: 1,
                total_price: Price::inr(50),
            }
        );
    }

    #[test]
    fn test_update_quantity_negative_removes_and_missing_is_noop() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 100), 2);
        cart.update_quantity(ProductId::new(9), 4);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 2);
        cart.update_quantity(ProductId::new(1), -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_sets() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 100), 2);
        cart.update_quantity(ProductId::new(1), 7);
        assert_eq!(cart.totals().total_items, 7);
        assert_eq!(cart.totals().total_price, Price::inr(700));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 100), 1);
        cart.remove_item(ProductId::new(2));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 100), 1);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::default());
    }

    #[test]
    fn test_summary_uses_policy() {
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 500), 1);
        let summary = cart.summary(&ShippingPolicy::default());
        assert_eq!(summary.shipping, Price::inr(99));
        assert_eq!(summary.total, Price::inr(599));

        cart.add_item(&product(1, 500), 1);
        let summary = cart.summary(&ShippingPolicy::default());
        assert_eq!(summary.shipping, Price::zero());
    }

    #[test]
    fn test_persist_and_load() {
        let store = MemoryStore::new();
        let mut cart = CartStore::new();
        cart.add_item(&product(1, 100), 2);
        cart.add_item(&product(2, 50), 1);
        cart.persist(&store).unwrap();

        let restored = CartStore::load(&store).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_load_missing_is_empty() {
        let store = MemoryStore::new();
        assert!(CartStore::load(&store).unwrap().is_empty());
    }

    #[test]
    fn test_from_lines_normalizes() {
        let p = product(1, 100);
        let cart = CartStore::from_lines([
            CartLine::from_product(&p, 2),
            CartLine::from_product(&product(2, 10), 0),
            CartLine::from_product(&p, 1),
        ]);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(p.id), 3);
    }

    #[test]
    fn test_totals_saturate_for_huge_price() {
        let mut p = product(1, 0);
        p.price = Price::new(rust_decimal::Decimal::MAX, p.price.currency_code);
        let mut cart = CartStore::new();
        cart.add_item(&p, 2);
        cart.add_item(&product(2, 10), 1);

        let totals = cart.totals();
        assert_eq!(totals.total_items, 3);
        assert_eq!(totals.total_price.amount, rust_decimal::Decimal::MAX);

        let summary = cart.summary(&ShippingPolicy::default());
        assert!(summary.shipping.amount.is_zero());
        assert_eq!(summary.total.amount, rust_decimal::Decimal::MAX);
    }
}
