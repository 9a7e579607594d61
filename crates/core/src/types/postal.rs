//! Postal index number.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a [`Pincode`] fails to parse.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("please enter a valid 6-digit pincode")]
pub struct PincodeError;

/// A six-digit Indian postal code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Parse a `Pincode` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`PincodeError`] unless the trimmed input is exactly six
    /// ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PincodeError> {
        let s = s.trim();
        if s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(PincodeError)
        }
    }

    /// Returns the pincode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert!(Pincode::parse("560001").is_ok());
        assert!(Pincode::parse(" 110011 ").is_ok());
        assert_eq!(Pincode::parse("56001"), Err(PincodeError));
        assert_eq!(Pincode::parse("5600011"), Err(PincodeError));
        assert_eq!(Pincode::parse("56000a"), Err(PincodeError));
        assert_eq!(Pincode::parse(""), Err(PincodeError));
    }
}
