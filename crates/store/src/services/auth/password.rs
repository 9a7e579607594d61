//! Argon2id password digests.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use bazaar_core::PasswordDigest;

use super::AuthError;
use crate::config::HashingCost;

/// Hashes and checks passwords with a fixed Argon2id cost.
///
/// Verification reads the cost from the stored digest, so changing the cost
/// does not invalidate existing accounts.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Create a hasher for `cost`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if Argon2 rejects the parameters.
    pub fn new(cost: HashingCost) -> Result<Self, AuthError> {
        let params = Params::new(cost.memory_kib, cost.iterations, 1, None)
            .map_err(|_| AuthError::PasswordHash)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password using Argon2id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub fn hash(&self, password: &str) -> Result<PasswordDigest, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| PasswordDigest::new(hash.to_string()))
            .map_err(|_| AuthError::PasswordHash)
    }

    /// Verify a password against a digest.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the password does not match
    /// or the digest is unreadable.
    pub fn verify(&self, password: &str, digest: &PasswordDigest) -> Result<(), AuthError> {
        let parsed_hash =
            PasswordHash::new(digest.as_str()).map_err(|_| AuthError::InvalidCredentials)?;
        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}
