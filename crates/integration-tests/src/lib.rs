//! Integration tests for Bazaar.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_flow` - Login, sign-up with OTP, profile edits, restarts
//! - `cart_properties` - Cart invariants under random operation sequences
//! - `catalog_admin` - Catalog editing through the operator account
//!
//! Everything runs against [`StoreConfig::instant`], so there is no simulated
//! latency and password hashing uses the minimal cost.

use std::path::PathBuf;

use bazaar_core::Price;
use bazaar_store::models::ProductDraft;
use bazaar_store::{AppState, StoreConfig};

/// Fresh in-memory state with no latency.
#[must_use]
pub fn memory_state() -> AppState {
    AppState::in_memory(StoreConfig::instant())
}

/// State backed by the JSON file at `path`, with no latency.
#[must_use]
pub fn file_state(path: PathBuf) -> AppState {
    let mut config = StoreConfig::instant();
    config.data_file = path;
    AppState::open(config)
}

/// A state file path unique to this call, under the system temp directory.
#[must_use]
pub fn temp_state_path() -> PathBuf {
    std::env::temp_dir()
        .join("bazaar-integration")
        .join(format!("{}.json", uuid::Uuid::new_v4()))
}

/// A valid product form.
#[must_use]
pub fn sample_draft(name: &str, rupees: i64) -> ProductDraft {
    ProductDraft {
        name: name.to_owned(),
        price: Price::inr(rupees),
        description: format!("{name} for testing"),
        category: "Sports".to_owned(),
        image: "https://images.example.com/sample.jpg".to_owned(),
        in_stock: true,
    }
}
