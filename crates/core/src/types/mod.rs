//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credential;
pub mod email;
pub mod id;
pub mod otp;
pub mod phone;
pub mod postal;
pub mod price;
pub mod status;

pub use credential::PasswordDigest;
pub use email::{Email, EmailError};
pub use id::*;
pub use otp::{OtpCode, OtpCodeError};
pub use phone::{PhoneNumber, PhoneNumberError};
pub use postal::{Pincode, PincodeError};
pub use price::{CurrencyCode, Price};
pub use status::*;
