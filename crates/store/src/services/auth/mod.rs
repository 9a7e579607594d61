//! Authentication service.
//!
//! [`SessionStore`] drives the sign-in state machine:
//!
//! ```text
//! Anonymous --register--> PendingVerification --verify_otp--> Authenticated
//!     ^                                                              |
//!     +---------------------------- logout --------------------------+
//! ```
//!
//! A successful `login` moves to Authenticated from any phase and drops a
//! sign-up in progress. Every transition is written through the key-value
//! port so a rebuilt store resumes where the last one stopped.

mod error;
pub mod operator;
pub mod otp;
pub mod password;

pub use error::AuthError;
pub use otp::{
    DeliveryError, FormatOnlyVerifier, IssuedCodeVerifier, LogDelivery, MemoryOutbox, OtpDelivery,
    OtpVerifier,
};
pub use password::CredentialHasher;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use bazaar_core::validation::{
    LoginForm, RegistrationForm, validate_email, validate_name, validate_phone, validate_pincode,
};
use bazaar_core::{FieldErrors, OtpCode, UserId, ValidationError};

use crate::config::{Latency, OperatorPasswords, StoreConfig};
use crate::db::{DirectoryEntry, KeyValueStore, RepositoryError, UserDirectory, get_json, set_json};
use crate::models::session::{PendingRegistration, SessionPhase, SessionState, keys};
use crate::models::user::{Address, AddressInput, ProfileUpdate, UserAccount};
use crate::services::simulate_latency;

/// Where to send the code after a successful sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    /// The phone number with all but its last four digits hidden.
    pub masked_phone: String,
    /// When the code was sent.
    pub sent_at: DateTime<Utc>,
}

/// Session state plus the operations that change it.
///
/// Operations take `&mut self`; a caller awaits each one before starting the
/// next.
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    directory: Arc<dyn UserDirectory>,
    verifier: Arc<dyn OtpVerifier>,
    hasher: CredentialHasher,
    operators: OperatorPasswords,
    latency: Latency,
    state: SessionState,
}

impl SessionStore {
    /// Create a session store, restoring any saved session from `kv`.
    ///
    /// Saved values that no longer decode are logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` for unusable hashing parameters and
    /// `AuthError::Repository` if `kv` cannot be read.
    pub fn new(
        config: &StoreConfig,
        kv: Arc<dyn KeyValueStore>,
        directory: Arc<dyn UserDirectory>,
        verifier: Arc<dyn OtpVerifier>,
    ) -> Result<Self, AuthError> {
        let hasher = CredentialHasher::new(config.hashing)?;
        let state = SessionState {
            current_user: restore(kv.as_ref(), keys::CURRENT_USER)?,
            pending: restore(kv.as_ref(), keys::PENDING_REGISTRATION)?,
        };
        debug!(phase = ?state.phase(), "session restored");

        Ok(Self {
            kv,
            directory,
            verifier,
            hasher,
            operators: config.operators.clone(),
            latency: config.latency,
            state,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The signed-in account.
    #[must_use]
    pub const fn current_user(&self) -> Option<&UserAccount> {
        self.state.current_user.as_ref()
    }

    /// The sign-up waiting for its OTP.
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingRegistration> {
        self.state.pending.as_ref()
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    // =========================================================================
    // Login / Logout
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// Tries the built-in operator accounts first, then the directory. A
    /// directory account never signs in as admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a blank or malformed field and
    /// `AuthError::InvalidCredentials` if nothing matches.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &str) -> Result<UserAccount, AuthError> {
        let email = LoginForm { email, password }.validate()?;
        simulate_latency(self.latency.standard).await;

        let account = if let Some(account) =
            operator::authenticate(&self.operators, &email, password)
        {
            account
        } else {
            let Some(entry) = self.directory.find_by_email(&email)? else {
                warn!("login for unknown email");
                return Err(AuthError::InvalidCredentials);
            };
            if let Err(e) = self.hasher.verify(password, &entry.password_hash) {
                warn!(user_id = %entry.account.id, "login with wrong password");
                return Err(e);
            }
            UserAccount {
                is_admin: false,
                ..entry.account
            }
        };

        self.sign_in(account.clone())?;
        info!(user_id = %account.id, is_admin = account.is_admin, "signed in");
        Ok(account)
    }

    /// Sign out. Clears the signed-in user and any sign-up in progress.
    #[instrument(skip(self))]
    pub fn logout(&mut self) {
        let user_id = self.state.current_user.as_ref().map(|u| u.id);
        self.state = SessionState::default();
        for key in [keys::CURRENT_USER, keys::PENDING_REGISTRATION] {
            if let Err(e) = self.kv.remove(key) {
                warn!(key, error = %e, "failed to clear stored session");
            }
        }
        info!(?user_id, "signed out");
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Start a sign-up. On success the account waits for OTP confirmation.
    ///
    /// A previous sign-up in progress is replaced.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyAuthenticated` while signed in,
    /// `AuthError::Validation` for bad fields, `AuthError::AccountAlreadyExists`
    /// if the email or phone is taken and `AuthError::OtpDelivery` if the code
    /// could not be sent. The session is unchanged on error.
    #[instrument(skip(self, password, phone))]
    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        name: &str,
        phone: &str,
    ) -> Result<OtpChallenge, AuthError> {
        if self.state.current_user.is_some() {
            return Err(AuthError::AlreadyAuthenticated);
        }
        let form = RegistrationForm {
            email,
            password,
            name,
            phone,
            confirm_password: None,
        }
        .validate()?;
        simulate_latency(self.latency.standard).await;

        if operator::is_operator_email(&form.email)
            || operator::is_operator_phone(&form.phone)
            || self
                .directory
                .find_by_email_or_phone(&form.email, Some(&form.phone))?
                .is_some()
        {
            warn!("registration for existing account");
            return Err(AuthError::AccountAlreadyExists);
        }

        let password_hash = self.hasher.hash(password)?;
        self.verifier
            .issue(&form.phone)
            .map_err(|e| AuthError::OtpDelivery(e.to_string()))?;

        let sent_at = Utc::now();
        let challenge = OtpChallenge {
            masked_phone: form.phone.masked(),
            sent_at,
        };
        let pending = PendingRegistration {
            account: UserAccount {
                id: UserId::generate(),
                email: form.email,
                name: form.name,
                phone: Some(form.phone),
                address: None,
                date_of_birth: None,
                gender: None,
                is_admin: false,
                is_verified: false,
                created_at: sent_at,
            },
            password_hash,
            otp_sent_at: sent_at,
        };
        set_json(self.kv.as_ref(), keys::PENDING_REGISTRATION, &pending)?;
        info!(user_id = %pending.account.id, "registration pending OTP");
        self.state.pending = Some(pending);
        Ok(challenge)
    }

    /// Confirm the pending sign-up with the code sent to its phone.
    ///
    /// On success the account is verified, added to the directory and signed
    /// in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NoPendingRegistration` with no sign-up in
    /// progress, `AuthError::InvalidOtp` if the code is malformed or rejected
    /// (the sign-up stays pending) and `AuthError::AccountAlreadyExists` if
    /// the email or phone was taken in the meantime.
    #[instrument(skip(self, code))]
    pub async fn verify_otp(&mut self, code: &str) -> Result<UserAccount, AuthError> {
        let Some(pending) = self.state.pending.as_ref() else {
            return Err(AuthError::NoPendingRegistration);
        };
        simulate_latency(self.latency.otp).await;

        let Ok(code) = OtpCode::parse(code) else {
            warn!("malformed OTP");
            return Err(AuthError::InvalidOtp);
        };
        let Some(phone) = pending.account.phone.as_ref() else {
            return Err(AuthError::InvalidOtp);
        };
        if !self.verifier.verify(phone, &code) {
            warn!("OTP rejected");
            return Err(AuthError::InvalidOtp);
        }

        let account = UserAccount {
            is_verified: true,
            ..pending.account.clone()
        };
        self.directory
            .append(DirectoryEntry {
                account: account.clone(),
                password_hash: pending.password_hash.clone(),
            })
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AccountAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        self.sign_in(account.clone())?;
        info!(user_id = %account.id, "registration verified");
        Ok(account)
    }

    /// Send the pending sign-up a fresh code.
    ///
    /// Never fails and never changes the phase. Without a sign-up in
    /// progress there is nothing to send.
    #[instrument(skip(self))]
    pub async fn resend_otp(&mut self) {
        simulate_latency(self.latency.standard).await;

        let Some(pending) = self.state.pending.as_mut() else {
            debug!("no registration pending; nothing to resend");
            return;
        };
        let Some(phone) = pending.account.phone.as_ref() else {
            return;
        };
        if let Err(e) = self.verifier.issue(phone) {
            warn!(error = %e, "failed to resend OTP");
            return;
        }
        pending.otp_sent_at = Utc::now();
        if let Err(e) = set_json(self.kv.as_ref(), keys::PENDING_REGISTRATION, &*pending) {
            warn!(error = %e, "failed to store resent OTP time");
        }
        info!("OTP resent");
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Change profile fields of the signed-in account.
    ///
    /// Empty `phone` clears the number; an address with every field blank
    /// clears the address.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` when signed out,
    /// `AuthError::Validation` for bad fields and
    /// `AuthError::AccountAlreadyExists` if the new email or phone belongs to
    /// another account.
    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &mut self,
        update: ProfileUpdate,
    ) -> Result<UserAccount, AuthError> {
        let Some(current) = self.state.current_user.as_ref() else {
            return Err(AuthError::NotAuthenticated);
        };
        let updated = apply_update(current, update)?;
        simulate_latency(self.latency.standard).await;

        if updated.email != current.email || updated.phone != current.phone {
            let taken_by_other = self.directory.list()?.iter().any(|other| {
                other.id != updated.id
                    && (other.email.as_str().eq_ignore_ascii_case(updated.email.as_str())
                        || (updated.phone.is_some() && other.phone == updated.phone))
            });
            let email_is_operator = !current
                .email
                .as_str()
                .eq_ignore_ascii_case(updated.email.as_str())
                && operator::is_operator_email(&updated.email);
            let phone_is_operator = updated.phone != current.phone
                && updated.phone.as_ref().is_some_and(operator::is_operator_phone);
            if taken_by_other || email_is_operator || phone_is_operator {
                warn!("profile update collides with another account");
                return Err(AuthError::AccountAlreadyExists);
            }
        }

        if !self.directory.update_by_id(&updated)? {
            debug!("account not in directory; updated session only");
        }
        set_json(self.kv.as_ref(), keys::CURRENT_USER, &updated)?;
        info!(user_id = %updated.id, "profile updated");
        self.state.current_user = Some(updated.clone());
        Ok(updated)
    }

    fn sign_in(&mut self, account: UserAccount) -> Result<(), AuthError> {
        set_json(self.kv.as_ref(), keys::CURRENT_USER, &account)?;
        self.kv.remove(keys::PENDING_REGISTRATION)?;
        self.state.current_user = Some(account);
        self.state.pending = None;
        Ok(())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state)
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

/// Read a saved session value, dropping it if it no longer decodes.
fn restore<T: DeserializeOwned>(
    kv: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, RepositoryError> {
    match get_json(kv, key) {
        Ok(value) => Ok(value),
        Err(RepositoryError::DataCorruption(reason)) => {
            warn!(key, %reason, "discarding corrupt session data");
            kv.remove(key)?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Validate `update` and merge it into a copy of `current`.
fn apply_update(current: &UserAccount, update: ProfileUpdate) -> Result<UserAccount, FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut account = current.clone();

    if let Some(name) = update.name {
        if let Some(name) = errors.check(validate_name(&name)) {
            account.name = name;
        }
    }
    if let Some(email) = update.email {
        if let Some(email) = errors.check(validate_email(&email)) {
            account.email = email;
        }
    }
    if let Some(phone) = update.phone {
        if phone.trim().is_empty() {
            account.phone = None;
        } else if let Some(phone) = errors.check(validate_phone(&phone)) {
            account.phone = Some(phone);
        }
    }
    if let Some(address) = update.address {
        match parse_address(address) {
            Ok(address) => account.address = address,
            Err(e) => errors.push(e),
        }
    }
    if let Some(date_of_birth) = update.date_of_birth {
        account.date_of_birth = Some(date_of_birth);
    }
    if let Some(gender) = update.gender {
        account.gender = Some(gender);
    }

    if errors.is_empty() {
        Ok(account)
    } else {
        Err(errors)
    }
}

fn parse_address(input: AddressInput) -> Result<Option<Address>, ValidationError> {
    let blank = [&input.street, &input.city, &input.state, &input.pincode]
        .iter()
        .all(|field| field.trim().is_empty());
    if blank {
        return Ok(None);
    }
    let pincode = validate_pincode(&input.pincode)?;
    Ok(Some(Address {
        street: input.street.trim().to_owned(),
        city: input.city.trim().to_owned(),
        state: input.state.trim().to_owned(),
        pincode,
    }))
}
