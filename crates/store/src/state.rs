//! Application state shared by every store.

use std::sync::Arc;

use crate::config::{OtpMode, StoreConfig};
use crate::db::{
    JsonFileStore, KeyValueStore, KvUserDirectory, MemoryStore, RepositoryError, UserDirectory,
};
use crate::services::auth::{
    AuthError, FormatOnlyVerifier, IssuedCodeVerifier, LogDelivery, OtpVerifier, SessionStore,
};
use crate::services::cart::CartStore;
use crate::services::catalog::Catalog;

/// Application state shared by the stores.
///
/// This struct is cheaply cloneable via `Arc`. It owns the ports and builds
/// store instances on request; there are no global singletons.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StoreConfig,
    kv: Arc<dyn KeyValueStore>,
    directory: Arc<dyn UserDirectory>,
    verifier: Arc<dyn OtpVerifier>,
}

impl AppState {
    /// Create state over `kv`, choosing the OTP verifier from `config`.
    #[must_use]
    pub fn new(config: StoreConfig, kv: Arc<dyn KeyValueStore>) -> Self {
        let verifier: Arc<dyn OtpVerifier> = match config.otp.mode {
            OtpMode::Format => Arc::new(FormatOnlyVerifier),
            OtpMode::Issued => Arc::new(IssuedCodeVerifier::new(
                config.otp.ttl,
                Arc::new(LogDelivery),
                Arc::clone(&kv),
            )),
        };
        Self::with_verifier(config, kv, verifier)
    }

    /// Create state with a caller-supplied OTP verifier.
    #[must_use]
    pub fn with_verifier(
        config: StoreConfig,
        kv: Arc<dyn KeyValueStore>,
        verifier: Arc<dyn OtpVerifier>,
    ) -> Self {
        let directory: Arc<dyn UserDirectory> = Arc::new(KvUserDirectory::new(Arc::clone(&kv)));
        Self {
            inner: Arc::new(AppStateInner {
                config,
                kv,
                directory,
                verifier,
            }),
        }
    }

    /// State kept in the JSON file named by `config.data_file`.
    #[must_use]
    pub fn open(config: StoreConfig) -> Self {
        let kv = Arc::new(JsonFileStore::new(config.data_file.clone()));
        Self::new(config, kv)
    }

    /// State that lives only as long as this value.
    #[must_use]
    pub fn in_memory(config: StoreConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    /// Get a reference to the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Get a reference to the key-value port.
    #[must_use]
    pub fn kv(&self) -> &dyn KeyValueStore {
        self.inner.kv.as_ref()
    }

    /// Get a reference to the user directory.
    #[must_use]
    pub fn directory(&self) -> &dyn UserDirectory {
        self.inner.directory.as_ref()
    }

    /// A session store resumed from the saved session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the hashing cost is invalid or the saved
    /// session cannot be read.
    pub fn session_store(&self) -> Result<SessionStore, AuthError> {
        SessionStore::new(
            &self.inner.config,
            Arc::clone(&self.inner.kv),
            Arc::clone(&self.inner.directory),
            Arc::clone(&self.inner.verifier),
        )
    }

    /// The saved cart, or an empty one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the saved cart cannot be read.
    pub fn load_cart(&self) -> Result<CartStore, RepositoryError> {
        CartStore::load(self.kv())
    }

    /// The saved catalog, or the stock one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the saved catalog cannot be read.
    pub fn load_catalog(&self) -> Result<Catalog, RepositoryError> {
        Catalog::load_or_seed(self.kv())
    }
}
