//! Bazaar Store - cart, session and catalog state.
//!
//! This crate holds the storefront's client-side state as plain Rust values
//! that a UI (or the `bazaar` CLI) drives through method calls:
//!
//! - [`services::cart::CartStore`] - line items, quantities, totals
//! - [`services::auth::SessionStore`] - login, sign-up with OTP, profile
//! - [`services::catalog::Catalog`] - product browsing and the admin table
//!
//! Persistence goes through the [`db::KeyValueStore`] port so the same code
//! runs against memory in tests and a JSON file in the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod state;

pub use config::StoreConfig;
pub use state::AppState;
