//! One-time passcode issuing and checking.
//!
//! [`FormatOnlyVerifier`] accepts any well-formed code and is the default.
//! [`IssuedCodeVerifier`] generates a random code per phone number and hands
//! it to an [`OtpDelivery`]. Only that code is accepted, and only until it
//! expires.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use bazaar_core::{OtpCode, PhoneNumber};

use crate::db::{KeyValueStore, RepositoryError, get_json, set_json};
use crate::models::session::keys;

/// Failure to hand a code to the user.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DeliveryError(pub String);

/// Sends a code to a phone.
pub trait OtpDelivery: Send + Sync {
    /// Deliver `code` to `phone`.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError` if the code could not be sent.
    fn deliver(&self, phone: &PhoneNumber, code: &OtpCode) -> Result<(), DeliveryError>;
}

/// Decides whether a typed code confirms a phone number.
pub trait OtpVerifier: Send + Sync {
    /// Start (or restart) verification of `phone`.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError` if a code had to be sent and could not be.
    fn issue(&self, phone: &PhoneNumber) -> Result<(), DeliveryError>;

    /// Whether `code` confirms `phone`.
    fn verify(&self, phone: &PhoneNumber, code: &OtpCode) -> bool;
}

/// Accepts any six-digit code. Nothing is sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOnlyVerifier;

impl OtpVerifier for FormatOnlyVerifier {
    fn issue(&self, phone: &PhoneNumber) -> Result<(), DeliveryError> {
        info!(phone = %phone.masked(), "OTP requested; any 6-digit code will be accepted");
        Ok(())
    }

    fn verify(&self, _phone: &PhoneNumber, _code: &OtpCode) -> bool {
        true
    }
}

/// Writes codes to the log. Stands in for an SMS gateway during development.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDelivery;

impl OtpDelivery for LogDelivery {
    fn deliver(&self, phone: &PhoneNumber, code: &OtpCode) -> Result<(), DeliveryError> {
        info!(phone = %phone.masked(), code = code.as_str(), "OTP issued");
        Ok(())
    }
}

/// Keeps the last code sent to each phone so callers can read it back.
#[derive(Debug, Default)]
pub struct MemoryOutbox {
    sent: Mutex<HashMap<PhoneNumber, OtpCode>>,
}

impl MemoryOutbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent code sent to `phone`.
    #[must_use]
    pub fn last_code(&self, phone: &PhoneNumber) -> Option<OtpCode> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(phone)
            .cloned()
    }
}

impl OtpDelivery for MemoryOutbox {
    fn deliver(&self, phone: &PhoneNumber, code: &OtpCode) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(phone.clone(), code.clone());
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct IssuedCode {
    code: OtpCode,
    expires_at: DateTime<Utc>,
}

type IssuedCodes = BTreeMap<String, IssuedCode>;

/// Accepts only the unexpired code most recently issued for a phone.
///
/// Codes are kept under the `issued_otps` key so a verification can happen
/// in a later process than the one that issued the code. A code is consumed
/// when it is accepted; issuing again replaces the previous code.
pub struct IssuedCodeVerifier {
    ttl: TimeDelta,
    delivery: Arc<dyn OtpDelivery>,
    store: Arc<dyn KeyValueStore>,
}

impl IssuedCodeVerifier {
    /// Create a verifier whose codes live for `ttl`.
    #[must_use]
    pub fn new(
        ttl: Duration,
        delivery: Arc<dyn OtpDelivery>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            delivery,
            store,
        }
    }

    fn load(&self) -> Result<IssuedCodes, RepositoryError> {
        Ok(get_json(self.store.as_ref(), keys::ISSUED_OTPS)?.unwrap_or_default())
    }

    fn save(&self, codes: &IssuedCodes) -> Result<(), RepositoryError> {
        if codes.is_empty() {
            self.store.remove(keys::ISSUED_OTPS)
        } else {
            set_json(self.store.as_ref(), keys::ISSUED_OTPS, codes)
        }
    }
}

impl std::fmt::Debug for IssuedCodeVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedCodeVerifier")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn random_code() -> Result<OtpCode, DeliveryError> {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    OtpCode::parse(&format!("{n:06}")).map_err(|e| DeliveryError(e.to_string()))
}

impl OtpVerifier for IssuedCodeVerifier {
    fn issue(&self, phone: &PhoneNumber) -> Result<(), DeliveryError> {
        let code = random_code()?;
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut codes = self.load().map_err(|e| DeliveryError(e.to_string()))?;
        codes.retain(|_, issued| issued.expires_at > Utc::now());
        codes.insert(
            phone.as_str().to_owned(),
            IssuedCode {
                code: code.clone(),
                expires_at,
            },
        );
        self.save(&codes).map_err(|e| DeliveryError(e.to_string()))?;

        self.delivery.deliver(phone, &code)?;
        debug!(phone = %phone.masked(), %expires_at, "stored issued OTP");
        Ok(())
    }

    fn verify(&self, phone: &PhoneNumber, code: &OtpCode) -> bool {
        let mut codes = match self.load() {
            Ok(codes) => codes,
            Err(e) => {
                warn!(error = %e, "cannot read issued OTPs");
                return false;
            }
        };
        let Some(issued) = codes.get(phone.as_str()) else {
            warn!(phone = %phone.masked(), "no OTP issued for phone");
            return false;
        };

        let accepted = if Utc::now() >= issued.expires_at {
            warn!(phone = %phone.masked(), "OTP expired");
            false
        } else if issued.code == *code {
            true
        } else {
            warn!(phone = %phone.masked(), "OTP mismatch");
            return false;
        };

        codes.remove(phone.as_str());
        if let Err(e) = self.save(&codes) {
            warn!(error = %e, "cannot update issued OTPs");
        }
        accepted
    }
}
