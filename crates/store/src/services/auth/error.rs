//! Authentication error types.

use thiserror::Error;

use bazaar_core::FieldErrors;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (wrong password or unknown email).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The email or phone number is already registered.
    #[error("an account with this email or phone number already exists")]
    AccountAlreadyExists,

    /// The OTP is malformed or was not accepted.
    #[error("invalid OTP")]
    InvalidOtp,

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NotAuthenticated,

    /// One or more form fields are invalid.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// OTP verification was attempted with no sign-up in progress.
    #[error("no registration is waiting for verification")]
    NoPendingRegistration,

    /// Sign-up was attempted while signed in.
    #[error("already signed in")]
    AlreadyAuthenticated,

    /// Storage error.
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// The OTP could not be delivered.
    #[error("could not send OTP: {0}")]
    OtpDelivery(String),
}

impl From<FieldErrors> for AuthError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}
