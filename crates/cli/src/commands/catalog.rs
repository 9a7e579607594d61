//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! bazaar catalog list
//! bazaar catalog list --category home-kitchen
//! bazaar catalog list --search watch
//! bazaar catalog show 5
//! ```

use clap::Subcommand;

use bazaar_core::ProductId;
use bazaar_store::AppState;
use bazaar_store::models::product::Product;

use super::CommandError;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List products
    List {
        /// Only this category (name or slug)
        #[arg(short, long)]
        category: Option<String>,

        /// Only products whose name or category contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one product
    Show {
        /// Product ID
        id: ProductId,
    },
    /// List categories
    Categories,
}

/// Run a catalog command.
///
/// # Errors
///
/// Returns `CommandError` if the catalog cannot be loaded or the product is
/// unknown.
#[allow(clippy::print_stdout)]
pub fn run(state: &AppState, action: CatalogAction) -> Result<(), CommandError> {
    let catalog = state.load_catalog()?;

    match action {
        CatalogAction::List { category, search } => {
            let mut products: Vec<&Product> = match category.as_deref() {
                Some(category) => catalog.by_category(category),
                None => catalog.products().iter().collect(),
            };
            if let Some(term) = search.as_deref() {
                let matches = catalog.search(term);
                products.retain(|p| matches.iter().any(|m| m.id == p.id));
            }
            if products.is_empty() {
                println!("No products found.");
            }
            for product in products {
                println!("{}", summary_line(product));
            }
        }
        CatalogAction::Show { id } => {
            let product = catalog.find(id).ok_or(CommandError::UnknownProduct(id))?;
            println!("{}", product.name);
            println!("  Price:    {}", product.price);
            println!("  Category: {}", product.category);
            println!("  Rating:   {:.1} ({} reviews)", product.rating, product.reviews);
            println!("  Stock:    {}", stock_label(product));
            println!("  {}", product.description);
            for image in product.gallery() {
                println!("  {image}");
            }
        }
        CatalogAction::Categories => {
            for category in catalog.categories() {
                let count = catalog.by_category(&category.slug).len();
                println!("{:<14} {:<16} {count} products", category.slug, category.name);
            }
        }
    }
    Ok(())
}

fn stock_label(product: &Product) -> &'static str {
    if product.in_stock { "in stock" } else { "out of stock" }
}

fn summary_line(product: &Product) -> String {
    format!(
        "{:>3}  {:<30} {:>10}  {:<15} {:.1}* {}",
        product.id.as_i32(),
        product.name,
        product.price.display(),
        product.category,
        product.rating,
        stock_label(product)
    )
}
