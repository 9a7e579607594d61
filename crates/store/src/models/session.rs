//! Session-related types.
//!
//! Types stored through the key-value port for authentication state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::PasswordDigest;

use super::user::UserAccount;

/// Where the session is in the sign-in state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Nobody is signed in and no sign-up is in progress.
    Anonymous,
    /// A sign-up is waiting for its OTP.
    PendingVerification,
    /// A user is signed in.
    Authenticated,
}

/// A sign-up waiting for OTP confirmation.
///
/// Held outside the directory; the account has `is_verified == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    /// The account as it will be stored once verified.
    pub account: UserAccount,
    /// Hash of the password chosen at sign-up.
    pub password_hash: PasswordDigest,
    /// When the OTP was (last) issued.
    pub otp_sent_at: DateTime<Utc>,
}

/// The session's identity state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The signed-in account.
    pub current_user: Option<UserAccount>,
    /// A sign-up in progress.
    pub pending: Option<PendingRegistration>,
}

impl SessionState {
    /// The phase this state is in.
    ///
    /// A signed-in user wins over a stale pending registration.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        match (&self.current_user, &self.pending) {
            (Some(_), _) => SessionPhase::Authenticated,
            (None, Some(_)) => SessionPhase::PendingVerification,
            (None, None) => SessionPhase::Anonymous,
        }
    }
}

/// Keys used with the key-value port.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for a sign-up waiting for its OTP.
    pub const PENDING_REGISTRATION: &str = "pending_registration";

    /// Key for the registered-users directory.
    pub const REGISTERED_USERS: &str = "registered_users";

    /// Key for cart lines.
    pub const CART: &str = "cart";

    /// Key for the product catalog.
    pub const CATALOG: &str = "catalog";

    /// Key for codes handed out by the issued-code OTP verifier.
    pub const ISSUED_OTPS: &str = "issued_otps";
}
