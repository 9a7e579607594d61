//! Catalog domain types.

use serde::{Deserialize, Serialize};

use bazaar_core::{Price, ProductId};

/// A product listed in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Primary image URL.
    pub image: String,
    /// Gallery image URLs; empty means only `image`.
    #[serde(default)]
    pub images: Vec<String>,
    pub description: String,
    /// Category display name, e.g. "Home & Kitchen".
    pub category: String,
    /// Average review score out of 5.
    pub rating: f32,
    pub reviews: u32,
    pub in_stock: bool,
}

impl Product {
    /// Images to show on the detail page.
    #[must_use]
    pub fn gallery(&self) -> Vec<&str> {
        if self.images.is_empty() {
            vec![self.image.as_str()]
        } else {
            self.images.iter().map(String::as_str).collect()
        }
    }
}

/// A browsing category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// URL slug, e.g. `home-kitchen`.
    pub slug: String,
    /// Display name, matched against [`Product::category`].
    pub name: String,
    pub image: String,
}

/// Editable product fields from the admin product form.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: Price,
    pub description: String,
    pub category: String,
    pub image: String,
    pub in_stock: bool,
}
