//! Cart domain types.

use serde::{Deserialize, Serialize};

use bazaar_core::{Price, ProductId};

use super::product::Product;

/// One product in the cart.
///
/// `quantity` is at least 1; a line whose quantity would drop to zero is
/// removed instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub image: String,
    pub category: String,
    pub quantity: u32,
}

impl CartLine {
    /// A line for `quantity` units of `product`.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            image: product.image.clone(),
            category: product.category.clone(),
            quantity,
        }
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Item count and price of the whole cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartTotals {
    /// Sum of line quantities.
    pub total_items: u64,
    /// Sum of line totals.
    pub total_price: Price,
}

/// Flat-rate shipping with a free-delivery threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Orders whose subtotal is strictly above this ship free.
    pub free_above: Price,
    /// Charged otherwise.
    pub flat_fee: Price,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_above: Price::inr(999),
            flat_fee: Price::inr(99),
        }
    }
}

impl ShippingPolicy {
    /// Shipping charged on `subtotal`. An empty cart ships nothing.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Price) -> Price {
        if subtotal.amount.is_zero() || subtotal.amount > self.free_above.amount {
            Price::new(rust_decimal::Decimal::ZERO, subtotal.currency_code)
        } else {
            self.flat_fee
        }
    }
}

/// What the cart page shows under the line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub total_items: u64,
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
    /// How much more to add for free delivery; `None` for an empty cart or
    /// a subtotal at or above the threshold.
    pub amount_to_free_shipping: Option<Price>,
}

impl CartSummary {
    /// Summarise `totals` under `policy`.
    #[must_use]
    pub fn new(totals: CartTotals, policy: &ShippingPolicy) -> Self {
        let subtotal = totals.total_price;
        let shipping = policy.shipping_for(subtotal);
        let amount_to_free_shipping =
            if subtotal.amount.is_zero() || subtotal.amount >= policy.free_above.amount {
                None
            } else {
                Some(Price::new(
                    policy.free_above.amount - subtotal.amount,
                    subtotal.currency_code,
                ))
            };

        Self {
            total_items: totals.total_items,
            subtotal,
            shipping,
            total: subtotal + shipping,
            amount_to_free_shipping,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(rupees: i64) -> CartTotals {
        CartTotals {
            total_items: 1,
            total_price: Price::inr(rupees),
        }
    }

    #[test]
    fn test_shipping_charged_at_or_below_threshold() {
        let policy = ShippingPolicy::default();
        let summary = CartSummary::new(totals(999), &policy);
        assert_eq!(summary.shipping, Price::inr(99));
        assert_eq!(summary.total, Price::inr(1_098));
        // Exactly at the threshold: still charged, nothing more needed.
        assert_eq!(summary.amount_to_free_shipping, None);
    }

    #[test]
    fn test_shipping_free_above_threshold() {
        let summary = CartSummary::new(totals(1_299), &ShippingPolicy::default());
        assert_eq!(summary.shipping, Price::zero());
        assert_eq!(summary.total, Price::inr(1_299));
    }

    #[test]
    fn test_amount_to_free_shipping() {
        let summary = CartSummary::new(totals(499), &ShippingPolicy::default());
        assert_eq!(summary.amount_to_free_shipping, Some(Price::inr(500)));
    }

    #[test]
    fn test_empty_cart_has_no_shipping() {
        let summary = CartSummary::new(CartTotals::default(), &ShippingPolicy::default());
        assert_eq!(summary.shipping, Price::zero());
        assert_eq!(summary.total, Price::zero());
        assert_eq!(summary.amount_to_free_shipping, None);
    }
}
