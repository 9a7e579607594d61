//! Catalog administration commands.
//!
//! These act as the signed-in user and are refused unless that user is the
//! operator admin account.
//!
//! # Usage
//!
//! ```bash
//! bazaar auth login -e admin@ecommerce.com -p password123
//! bazaar admin add-product --name "Cricket Bat" --price 2999 --category Sports \
//!     --image https://images.example.com/bat.jpg
//! bazaar admin update-product 9 --price 2499 --out-of-stock
//! bazaar admin delete-product 9
//! ```

use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use bazaar_core::{CurrencyCode, Price, ProductId};
use bazaar_store::AppState;
use bazaar_store::models::product::{Product, ProductDraft};

use super::CommandError;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Add a product
    AddProduct {
        #[arg(long)]
        name: String,

        /// Price in rupees
        #[arg(long)]
        price: Decimal,

        #[arg(long)]
        category: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Image URL
        #[arg(long, default_value = "")]
        image: String,

        /// List the product as unavailable
        #[arg(long)]
        out_of_stock: bool,
    },
    /// Change a product; omitted flags keep their current value
    UpdateProduct {
        /// Product ID
        id: ProductId,

        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product
    DeleteProduct {
        /// Product ID
        id: ProductId,
    },
}

/// Optional product fields for an update.
#[derive(Args)]
pub struct ProductFields {
    #[arg(long)]
    name: Option<String>,

    /// Price in rupees
    #[arg(long)]
    price: Option<Decimal>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Image URL
    #[arg(long)]
    image: Option<String>,

    /// Mark in stock
    #[arg(long, conflicts_with = "out_of_stock")]
    in_stock: bool,

    /// Mark out of stock
    #[arg(long)]
    out_of_stock: bool,
}

impl ProductFields {
    fn merge_into(self, product: &Product) -> ProductDraft {
        let in_stock = if self.in_stock {
            true
        } else if self.out_of_stock {
            false
        } else {
            product.in_stock
        };
        ProductDraft {
            name: self.name.unwrap_or_else(|| product.name.clone()),
            price: self.price.map_or(product.price, |amount| {
                Price::new(amount, product.price.currency_code)
            }),
            description: self
                .description
                .unwrap_or_else(|| product.description.clone()),
            category: self.category.unwrap_or_else(|| product.category.clone()),
            image: self.image.unwrap_or_else(|| product.image.clone()),
            in_stock,
        }
    }
}

/// Run an admin command and save the catalog.
///
/// # Errors
///
/// Returns `CommandError` if the signed-in user is not an admin, the product
/// is unknown or the draft is invalid.
#[allow(clippy::print_stdout)]
pub fn run(state: &AppState, action: AdminAction) -> Result<(), CommandError> {
    let session = state.session_store()?;
    let actor = session.current_user();
    let mut catalog = state.load_catalog()?;

    match action {
        AdminAction::AddProduct {
            name,
            price,
            category,
            description,
            image,
            out_of_stock,
        } => {
            let draft = ProductDraft {
                name,
                price: Price::new(price, CurrencyCode::INR),
                description,
                category,
                image,
                in_stock: !out_of_stock,
            };
            let id = catalog.add_product(actor, draft)?;
            println!("Added product {id}.");
        }
        AdminAction::UpdateProduct { id, fields } => {
            let current = catalog.find(id).ok_or(CommandError::UnknownProduct(id))?;
            let draft = fields.merge_into(current);
            let product = catalog.update_product(actor, id, draft)?;
            println!("Updated product {}: {} at {}", product.id, product.name, product.price);
        }
        AdminAction::DeleteProduct { id } => {
            let removed = catalog.delete_product(actor, id)?;
            println!("Deleted product {}: {}", removed.id, removed.name);
        }
    }

    catalog.persist(state.kv())?;
    Ok(())
}
