//! User domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{Email, Gender, PhoneNumber, Pincode, UserId};

/// A storefront account.
///
/// `is_admin` is only ever true for the operator account; no operation that
/// takes user input can set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Unique account ID.
    pub id: UserId,
    /// Sign-in email, unique within the directory.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Mobile number confirmed by OTP at sign-up.
    pub phone: Option<PhoneNumber>,
    /// Delivery address.
    pub address: Option<Address>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Gender.
    pub gender: Option<Gender>,
    /// Whether this is the operator account.
    pub is_admin: bool,
    /// Whether the phone number has been confirmed.
    pub is_verified: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// A delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: Pincode,
}

/// Unvalidated address fields from the profile form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressInput {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Profile fields to change. `None` leaves a field as it is.
///
/// Identity, admin and verification flags are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<AddressInput>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl ProfileUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.date_of_birth.is_none()
            && self.gender.is_none()
    }
}
