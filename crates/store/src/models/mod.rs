//! Domain models for the storefront.
//!
//! These types are plain data. Behaviour lives in [`crate::services`].

pub mod cart;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{CartLine, CartSummary, CartTotals, ShippingPolicy};
pub use product::{Category, Product, ProductDraft};
pub use session::{PendingRegistration, SessionPhase, SessionState};
pub use user::{Address, AddressInput, ProfileUpdate, UserAccount};
