//! Bazaar Core - Shared types library.
//!
//! This crate provides common types used across all Bazaar components:
//! - `store` - Cart, session and catalog state
//! - `cli` - Command-line driver for the stores
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no async runtime. This keeps it lightweight and allows form code to
//! validate input before calling into a store.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, phones and codes
//! - [`validation`] - Field-level validators for registration and profile forms

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{FieldErrors, ValidationError};
