//! CLI command implementations.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod profile;

use thiserror::Error;

use bazaar_core::ProductId;
use bazaar_store::db::RepositoryError;
use bazaar_store::models::user::UserAccount;
use bazaar_store::services::auth::AuthError;
use bazaar_store::services::catalog::CatalogError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Authentication or profile error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Catalog error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Storage error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// No product with the given ID.
    #[error("No product with ID {0}")]
    UnknownProduct(ProductId),

    /// An update command was given no fields.
    #[error("Nothing to update; pass at least one field")]
    NothingToUpdate,
}

/// One-line account description.
pub fn describe_account(user: &UserAccount) -> String {
    let role = if user.is_admin { "admin" } else { "customer" };
    let phone = user
        .phone
        .as_ref()
        .map_or_else(|| "no phone".to_owned(), ToString::to_string);
    format!("{} <{}> [{role}] {phone}", user.name, user.email)
}
