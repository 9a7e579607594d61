//! Storefront state services.
//!
//! # Services
//!
//! - `auth` - Login, sign-up with OTP confirmation, profile updates
//! - `cart` - Cart lines and totals
//! - `catalog` - Product browsing and the admin product table

pub mod auth;
pub mod cart;
pub mod catalog;

use std::time::Duration;

/// Await `delay`, standing in for a round trip to a backend.
pub(crate) async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
