//! Product catalog and the admin product table.
//!
//! The catalog starts from a fixed seed of eight products in five
//! categories. Admin edits replace the product list, which is then saved
//! under the `catalog` key; categories are fixed.

use thiserror::Error;
use tracing::{info, instrument, warn};

use bazaar_core::{FieldErrors, Price, ProductId, ValidationError};

use crate::db::{KeyValueStore, RepositoryError, get_json, set_json};
use crate::models::product::{Category, Product, ProductDraft};
use crate::models::session::keys;
use crate::models::user::UserAccount;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The actor is not signed in as an administrator.
    #[error("admin access required")]
    Forbidden,

    /// No product with that ID.
    #[error("product not found")]
    NotFound,

    /// The product form has invalid fields.
    #[error("invalid product: {0}")]
    Validation(FieldErrors),

    /// Storage error.
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Browsable products plus the admin edit operations.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    /// The stock catalog.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            products: seed::products(),
            categories: seed::categories(),
        }
    }

    /// Restore edited products from the `catalog` key, or seed a fresh
    /// catalog if nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored value is not a
    /// product list.
    pub fn load_or_seed(store: &dyn KeyValueStore) -> Result<Self, RepositoryError> {
        let stored: Option<Vec<Product>> = get_json(store, keys::CATALOG)?;
        Ok(match stored {
            Some(products) => Self {
                products,
                categories: seed::categories(),
            },
            None => Self::seeded(),
        })
    }

    /// Save the product list under the `catalog` key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be written.
    pub fn persist(&self, store: &dyn KeyValueStore) -> Result<(), RepositoryError> {
        set_json(store, keys::CATALOG, &self.products)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products in a category, given by display name or slug.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&Product> {
        let name = self
            .categories
            .iter()
            .find(|c| c.slug.eq_ignore_ascii_case(category))
            .map_or(category, |c| c.name.as_str());
        self.products
            .iter()
            .filter(|p| p.category.eq_ignore_ascii_case(name))
            .collect()
    }

    /// Products whose name or category contains `term`, ignoring case.
    ///
    /// A blank term matches everything.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&Product> {
        let needle = term.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Add a product from the admin form. Returns its new ID.
    ///
    /// New products start with no rating and no reviews.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Forbidden` unless `actor` is an admin, and
    /// `CatalogError::Validation` for a bad draft.
    #[instrument(skip(self, actor, draft), fields(name = %draft.name))]
    pub fn add_product(
        &mut self,
        actor: Option<&UserAccount>,
        draft: ProductDraft,
    ) -> Result<ProductId, CatalogError> {
        require_admin(actor)?;
        let draft = validate_draft(draft)?;

        let id = self
            .products
            .iter()
            .map(|p| p.id)
            .max()
            .map_or_else(|| ProductId::new(1), |max| max.next());

        self.products.push(Product {
            id,
            name: draft.name,
            price: draft.price,
            image: draft.image,
            images: Vec::new(),
            description: draft.description,
            category: draft.category,
            rating: 0.0,
            reviews: 0,
            in_stock: draft.in_stock,
        });
        info!(product_id = %id, "product added");
        Ok(id)
    }

    /// Replace a product's editable fields, keeping its rating and reviews.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Forbidden` unless `actor` is an admin,
    /// `CatalogError::Validation` for a bad draft and `CatalogError::NotFound`
    /// for an unknown ID.
    #[instrument(skip(self, actor, draft))]
    pub fn update_product(
        &mut self,
        actor: Option<&UserAccount>,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<&Product, CatalogError> {
        require_admin(actor)?;
        let draft = validate_draft(draft)?;

        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CatalogError::NotFound)?;

        if product.image != draft.image {
            product.images.clear();
        }
        product.name = draft.name;
        product.price = draft.price;
        product.description = draft.description;
        product.category = draft.category;
        product.image = draft.image;
        product.in_stock = draft.in_stock;
        info!("product updated");
        Ok(product)
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Forbidden` unless `actor` is an admin and
    /// `CatalogError::NotFound` for an unknown ID.
    #[instrument(skip(self, actor))]
    pub fn delete_product(
        &mut self,
        actor: Option<&UserAccount>,
        id: ProductId,
    ) -> Result<Product, CatalogError> {
        require_admin(actor)?;
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or(CatalogError::NotFound)?;
        info!("product deleted");
        Ok(self.products.remove(index))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::seeded()
    }
}

fn require_admin(actor: Option<&UserAccount>) -> Result<(), CatalogError> {
    match actor {
        Some(user) if user.is_admin => Ok(()),
        _ => {
            warn!(
                user_id = ?actor.map(|u| u.id),
                "catalog edit without admin access"
            );
            Err(CatalogError::Forbidden)
        }
    }
}

fn validate_draft(mut draft: ProductDraft) -> Result<ProductDraft, CatalogError> {
    let mut errors = FieldErrors::new();
    draft.name = draft.name.trim().to_owned();
    draft.category = draft.category.trim().to_owned();
    if draft.name.is_empty() {
        errors.push(ValidationError::new("name", "product name is required"));
    }
    if draft.category.is_empty() {
        errors.push(ValidationError::new("category", "category is required"));
    }
    if draft.price.is_negative() {
        errors.push(ValidationError::new("price", "price cannot be negative"));
    }
    if errors.is_empty() {
        Ok(draft)
    } else {
        Err(CatalogError::Validation(errors))
    }
}

mod seed {
    use super::{Category, Price, Product, ProductId};

    fn pexels(path: &str) -> String {
        format!("https://images.pexels.com/photos/{path}?auto=compress&cs=tinysrgb&w=800")
    }

    struct Row {
        id: i32,
        name: &'static str,
        price: i64,
        description: &'static str,
        category: &'static str,
        rating: f32,
        reviews: u32,
        images: &'static [&'static str],
    }

    const ROWS: &[Row] = &[
        Row {
            id: 1,
            name: "Premium Wireless Headphones",
            price: 24_999,
            description: "High-quality wireless headphones with noise cancellation and premium sound quality.",
            category: "Electronics",
            rating: 4.8,
            reviews: 324,
            images: &[
                "3394650/pexels-photo-3394650.jpeg",
                "205926/pexels-photo-205926.jpeg",
                "1649771/pexels-photo-1649771.jpeg",
            ],
        },
        Row {
            id: 2,
            name: "Smart Fitness Watch",
            price: 16_999,
            description: "Advanced fitness tracking with heart rate monitoring and GPS.",
            category: "Electronics",
            rating: 4.6,
            reviews: 156,
            images: &[
                "437037/pexels-photo-437037.jpeg",
                "393047/pexels-photo-393047.jpeg",
            ],
        },
        Row {
            id: 3,
            name: "Organic Cotton T-Shirt",
            price: 1_299,
            description: "Comfortable and sustainable organic cotton t-shirt in various colors.",
            category: "Clothing",
            rating: 4.4,
            reviews: 89,
            images: &[
                "996329/pexels-photo-996329.jpeg",
                "1040945/pexels-photo-1040945.jpeg",
            ],
        },
        Row {
            id: 4,
            name: "Modern Coffee Maker",
            price: 12_999,
            description: "Programmable coffee maker with built-in grinder and thermal carafe.",
            category: "Home & Kitchen",
            rating: 4.7,
            reviews: 203,
            images: &[
                "324028/pexels-photo-324028.jpeg",
                "302899/pexels-photo-302899.jpeg",
            ],
        },
        Row {
            id: 5,
            name: "Professional Camera",
            price: 74_999,
            description: "High-end DSLR camera perfect for professional photography.",
            category: "Electronics",
            rating: 4.9,
            reviews: 76,
            images: &[
                "51383/photo-camera-subject-photographer-51383.jpeg",
                "90946/pexels-photo-90946.jpeg",
            ],
        },
        Row {
            id: 6,
            name: "Yoga Mat Premium",
            price: 2_499,
            description: "Non-slip yoga mat made from eco-friendly materials.",
            category: "Sports",
            rating: 4.5,
            reviews: 142,
            images: &[
                "4056723/pexels-photo-4056723.jpeg",
                "3822583/pexels-photo-3822583.jpeg",
            ],
        },
        Row {
            id: 7,
            name: "Designer Sunglasses",
            price: 8_999,
            description: "Stylish sunglasses with UV protection and polarized lenses.",
            category: "Fashion",
            rating: 4.3,
            reviews: 95,
            images: &[
                "46710/pexels-photo-46710.jpeg",
                "1694900/pexels-photo-1694900.jpeg",
            ],
        },
        Row {
            id: 8,
            name: "Leather Backpack",
            price: 6_999,
            description: "Durable leather backpack perfect for work and travel.",
            category: "Fashion",
            rating: 4.6,
            reviews: 167,
            images: &[
                "1545998/pexels-photo-1545998.jpeg",
                "2905238/pexels-photo-2905238.jpeg",
            ],
        },
    ];

    pub(super) fn products() -> Vec<Product> {
        ROWS.iter()
            .map(|row| {
                let images: Vec<String> = row.images.iter().map(|path| pexels(path)).collect();
                Product {
                    id: ProductId::new(row.id),
                    name: row.name.to_owned(),
                    price: Price::inr(row.price),
                    image: images.first().cloned().unwrap_or_default(),
                    images,
                    description: row.description.to_owned(),
                    category: row.category.to_owned(),
                    rating: row.rating,
                    reviews: row.reviews,
                    in_stock: true,
                }
            })
            .collect()
    }

    pub(super) fn categories() -> Vec<Category> {
        [
            ("electronics", "Electronics", "356056/pexels-photo-356056.jpeg"),
            ("clothing", "Clothing", "996329/pexels-photo-996329.jpeg"),
            ("home-kitchen", "Home & Kitchen", "1599791/pexels-photo-1599791.jpeg"),
            ("sports", "Sports", "4056723/pexels-photo-4056723.jpeg"),
            ("fashion", "Fashion", "46710/pexels-photo-46710.jpeg"),
        ]
        .into_iter()
        .map(|(slug, name, image)| Category {
            slug: slug.to_owned(),
            name: name.to_owned(),
            image: pexels(image),
        })
        .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use bazaar_core::{Email, UserId};

    use super::*;
    use crate::db::MemoryStore;

    fn account(is_admin: bool) -> UserAccount {
        UserAccount {
            id: UserId::generate(),
            email: Email::parse("someone@x.com").unwrap(),
            name: "Someone".to_owned(),
            phone: None,
            address: None,
            date_of_birth: None,
            gender: None,
            is_admin,
            is_verified: true,
            created_at: Utc::now(),
        }
    }

    fn draft(name: &str, rupees: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_owned(),
            price: Price::inr(rupees),
            description: "A thing".to_owned(),
            category: "Sports".to_owned(),
            image: "https://img.test/new.jpg".to_owned(),
            in_stock: true,
        }
    }

    #[test]
    fn test_seed() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.products().len(), 8);
        assert_eq!(catalog.categories().len(), 5);
        let headphones = catalog.find(ProductId::new(1)).unwrap();
        assert_eq!(headphones.price, Price::inr(24_999));
        assert_eq!(headphones.gallery().len(), 3);
        assert_eq!(headphones.images.first(), Some(&headphones.image));
    }

    #[test]
    fn test_by_category_name_or_slug() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.by_category("Electronics").len(), 3);
        assert_eq!(catalog.by_category("home-kitchen").len(), 1);
        assert_eq!(catalog.by_category("fashion").len(), 2);
        assert!(catalog.by_category("Toys").is_empty());
    }

    #[test]
    fn test_search_name_or_category() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.search("CAMERA").len(), 1);
        assert_eq!(catalog.search("kitchen").len(), 1);
        assert_eq!(catalog.search("  ").len(), 8);
        assert!(catalog.search("zzz").is_empty());
    }

    #[test]
    fn test_add_requires_admin() {
        let mut catalog = Catalog::seeded();
        let user = account(false);
        assert!(matches!(
            catalog.add_product(Some(&user), draft("Ball", 499)),
            Err(CatalogError::Forbidden)
        ));
        assert!(matches!(
            catalog.add_product(None, draft("Ball", 499)),
            Err(CatalogError::Forbidden)
        ));
        assert_eq!(catalog.products().len(), 8);
    }

    #[test]
    fn test_add_assigns_next_id() {
        let mut catalog = Catalog::seeded();
        let admin = account(true);
        let id = catalog.add_product(Some(&admin), draft("Ball", 499)).unwrap();
        assert_eq!(id, ProductId::new(9));
        let added = catalog.find(id).unwrap();
        assert!(added.rating.abs() < f32::EPSILON);
        assert_eq!(added.reviews, 0);
    }

    #[test]
    fn test_add_validates_draft() {
        let mut catalog = Catalog::seeded();
        let admin = account(true);
        let mut bad = draft("  ", -5);
        bad.category = String::new();
        let Err(CatalogError::Validation(errors)) = catalog.add_product(Some(&admin), bad) else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_update_keeps_rating() {
        let mut catalog = Catalog::seeded();
        let admin = account(true);
        let updated = catalog
            .update_product(Some(&admin), ProductId::new(1), draft("Headphones", 19_999))
            .unwrap();
        assert_eq!(updated.name, "Headphones");
        assert_eq!(updated.reviews, 324);
        assert!((updated.rating - 4.8).abs() < f32::EPSILON);
        assert_eq!(updated.gallery(), vec!["https://img.test/new.jpg"]);
    }

    #[test]
    fn test_update_and_delete_unknown() {
        let mut catalog = Catalog::seeded();
        let admin = account(true);
        assert!(matches!(
            catalog.update_product(Some(&admin), ProductId::new(99), draft("X", 1)),
            Err(CatalogError::NotFound)
        ));
        assert!(matches!(
            catalog.delete_product(Some(&admin), ProductId::new(99)),
            Err(CatalogError::NotFound)
        ));
    }

    #[test]
    fn test_delete() {
        let mut catalog = Catalog::seeded();
        let admin = account(true);
        let removed = catalog.delete_product(Some(&admin), ProductId::new(3)).unwrap();
        assert_eq!(removed.name, "Organic Cotton T-Shirt");
        assert!(catalog.find(ProductId::new(3)).is_none());
    }

    #[test]
    fn test_persist_and_load() {
        let store = MemoryStore::new();
        assert_eq!(Catalog::load_or_seed(&store).unwrap().products().len(), 8);

        let mut catalog = Catalog::seeded();
        let admin = account(true);
        catalog.delete_product(Some(&admin), ProductId::new(8)).unwrap();
        catalog.persist(&store).unwrap();

        let restored = Catalog::load_or_seed(&store).unwrap();
        assert_eq!(restored.products().len(), 7);
        assert_eq!(restored.categories().len(), 5);
    }
}
