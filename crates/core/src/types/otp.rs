//! One-time passcode type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when an [`OtpCode`] fails to parse.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("please enter a valid {}-digit OTP", OtpCode::LENGTH)]
pub struct OtpCodeError;

/// A six-digit one-time passcode as typed by the user.
///
/// Only the shape is checked here. Whether the code is the one that was
/// issued is up to the verifier in the store crate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Number of digits in a code.
    pub const LENGTH: usize = 6;

    /// Parse an `OtpCode`.
    ///
    /// # Errors
    ///
    /// Returns [`OtpCodeError`] unless the input is exactly six ASCII digits.
    /// No trimming is done: a code with stray spaces is malformed.
    pub fn parse(s: &str) -> Result<Self, OtpCodeError> {
        if s.len() == Self::LENGTH && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(OtpCodeError)
        }
    }

    /// Returns the code digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are short-lived secrets; keep them out of logs.
impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(******)")
    }
}
