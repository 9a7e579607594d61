//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! bazaar cart add 1 --quantity 2
//! bazaar cart set 1 5
//! bazaar cart remove 1
//! bazaar cart show
//! bazaar cart clear
//! ```

use clap::Subcommand;

use bazaar_core::ProductId;
use bazaar_store::AppState;
use bazaar_store::services::cart::CartStore;

use super::CommandError;

#[derive(Subcommand)]
pub enum CartAction {
    /// Add a product
    Add {
        /// Product ID
        id: ProductId,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a line; zero or less removes it
    Set {
        /// Product ID
        id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Empty the cart
    Clear,
    /// Show lines and totals
    Show,
}

/// Run a cart command, saving the cart afterwards.
///
/// # Errors
///
/// Returns `CommandError` if the state file cannot be used or the product is
/// unknown.
pub fn run(state: &AppState, action: CartAction) -> Result<(), CommandError> {
    let mut cart = state.load_cart()?;

    match action {
        CartAction::Add { id, quantity } => {
            let catalog = state.load_catalog()?;
            let product = catalog.find(id).ok_or(CommandError::UnknownProduct(id))?;
            if !product.in_stock {
                tracing::warn!(product_id = %id, "adding an out-of-stock product");
            }
            cart.add_item(product, quantity);
        }
        CartAction::Set { id, quantity } => cart.update_quantity(id, quantity),
        CartAction::Remove { id } => cart.remove_item(id),
        CartAction::Clear => cart.clear(),
        CartAction::Show => {}
    }

    cart.persist(state.kv())?;
    print_cart(state, &cart);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart(state: &AppState, cart: &CartStore) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.lines() {
        println!(
            "{:>3}  {:<30} {:>3} x {:>10} = {:>10}",
            line.product_id.as_i32(),
            line.name,
            line.quantity,
            line.unit_price.display(),
            line.line_total().display()
        );
    }

    let summary = cart.summary(&state.config().shipping);
    println!();
    println!("Items:    {}", summary.total_items);
    println!("Subtotal: {}", summary.subtotal);
    if summary.shipping.amount.is_zero() {
        println!("Shipping: FREE");
    } else {
        println!("Shipping: {}", summary.shipping);
    }
    println!("Total:    {}", summary.total);
    if let Some(remaining) = summary.amount_to_free_shipping {
        println!("Add {remaining} more for free shipping.");
    }
}
