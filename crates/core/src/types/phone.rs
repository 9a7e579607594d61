//! Mobile phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    /// The input string is empty.
    #[error("phone number is required")]
    Empty,
    /// The input is not ten digits starting with 6, 7, 8 or 9.
    #[error("please enter a valid Indian mobile number")]
    InvalidFormat,
}

/// An Indian mobile number: ten digits, the first one 6 through 9.
///
/// Stored without country code or separators so that two spellings of the
/// same number compare equal. Surrounding whitespace is trimmed.
///
/// ```
/// use bazaar_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("9876543210").unwrap();
/// assert_eq!(phone.to_string(), "+91 98765 43210");
/// assert!(PhoneNumber::parse("5876543210").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Number of digits in a mobile number.
    pub const DIGITS: usize = 10;

    /// Parse a `PhoneNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneNumberError::Empty`] for blank input and
    /// [`PhoneNumberError::InvalidFormat`] for anything else that is not a
    /// ten-digit number starting with 6-9.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        let valid = s.len() == Self::DIGITS
            && s.bytes().all(|b| b.is_ascii_digit())
            && matches!(s.as_bytes().first(), Some(b'6'..=b'9'));
        if !valid {
            return Err(PhoneNumberError::InvalidFormat);
        }

        Ok(Self(s.to_owned()))
    }

    /// The bare ten digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number with all but the last four digits hidden, for messages
    /// such as "code sent to ******3210".
    #[must_use]
    pub fn masked(&self) -> String {
        let visible = self.0.get(Self::DIGITS - 4..).unwrap_or("");
        format!("******{visible}")
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.0.get(..5), self.0.get(5..)) {
            (Some(head), Some(tail)) => write!(f, "+91 {head} {tail}"),
            _ => f.write_str(&self.0),
        }
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
