//! Persistence ports and adapters.
//!
//! # Key-value port
//!
//! Everything the storefront keeps between runs is a JSON document under one
//! of the keys in [`crate::models::session::keys`]:
//!
//! - `current_user` - the signed-in account
//! - `pending_registration` - an account waiting for its OTP
//! - `registered_users` - the user directory
//! - `cart` - cart lines
//! - `catalog` - products as edited through the admin table
//! - `issued_otps` - outstanding codes of the issued-code OTP verifier
//!
//! Adapters: [`memory::MemoryStore`] for tests and embedding, and
//! [`file::JsonFileStore`] for the CLI.

pub mod file;
pub mod memory;
pub mod users;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use users::{DirectoryEntry, KvUserDirectory, UserDirectory};

/// Errors from persistence adapters.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The backing file could not be read or written.
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// A string key-value store, the stand-in for browser local storage.
///
/// Calls are synchronous and expected to succeed; errors only surface from
/// adapters with real I/O behind them.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backing storage cannot be written.
    fn set(&self, key: &str, value: String) -> Result<(), RepositoryError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), RepositoryError>;
}

/// Read and decode a JSON value.
///
/// # Errors
///
/// Returns `RepositoryError::DataCorruption` if the stored text is not a
/// valid `T`.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, RepositoryError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid JSON under {key}: {e}")))
}

/// Encode a value as JSON and store it.
///
/// # Errors
///
/// Returns `RepositoryError` if encoding or writing fails.
pub fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), RepositoryError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw)
}
