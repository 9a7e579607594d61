//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `BAZAAR_DATA_FILE` - JSON state file used by the CLI (default: .bazaar/state.json)
//! - `BAZAAR_LATENCY_MS` - Simulated latency for login, register, resend and
//!   profile updates (default: 1000)
//! - `BAZAAR_OTP_LATENCY_MS` - Simulated latency for OTP verification (default: 1500)
//! - `BAZAAR_OTP_MODE` - `format` or `issued` (default: format)
//! - `BAZAAR_OTP_TTL_SECS` - Lifetime of an issued code (default: 300)
//! - `BAZAAR_FREE_SHIPPING_ABOVE` - Free-shipping threshold in INR (default: 999)
//! - `BAZAAR_SHIPPING_FEE` - Flat shipping fee in INR (default: 99)
//! - `BAZAAR_ADMIN_PASSWORD` - Operator admin password (default: password123)
//! - `BAZAAR_DEMO_PASSWORD` - Demo user password (default: password123)
//! - `BAZAAR_HASH_MEMORY_KIB` - Argon2 memory cost (default: 19456)
//! - `BAZAAR_HASH_ITERATIONS` - Argon2 iterations (default: 2)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use bazaar_core::Price;

use crate::models::cart::ShippingPolicy;

const DEFAULT_OPERATOR_PASSWORD: &str = "password123";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// JSON key-value file backing the CLI
    pub data_file: PathBuf,
    /// Simulated network latency
    pub latency: Latency,
    /// One-time passcode policy
    pub otp: OtpConfig,
    /// Shipping rules for the cart summary
    pub shipping: ShippingPolicy,
    /// Passwords of the two fixed operator accounts
    pub operators: OperatorPasswords,
    /// Argon2 cost for new password digests
    pub hashing: HashingCost,
}

/// Delays that stand in for remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    /// Login, register, resend and profile update.
    pub standard: Duration,
    /// OTP verification.
    pub otp: Duration,
}

impl Latency {
    /// No delay at all.
    pub const ZERO: Self = Self {
        standard: Duration::ZERO,
        otp: Duration::ZERO,
    };
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            standard: Duration::from_millis(1000),
            otp: Duration::from_millis(1500),
        }
    }
}

/// Which OTP verifier the session store uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OtpMode {
    /// Accept any six digits.
    #[default]
    Format,
    /// Accept only the unexpired code that was issued.
    Issued,
}

impl FromStr for OtpMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "format" => Ok(Self::Format),
            "issued" => Ok(Self::Issued),
            other => Err(format!("expected `format` or `issued`, got `{other}`")),
        }
    }
}

/// OTP settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpConfig {
    pub mode: OtpMode,
    /// How long an issued code stays valid.
    pub ttl: Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            mode: OtpMode::Format,
            ttl: Duration::from_secs(300),
        }
    }
}

/// Operator account passwords.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct OperatorPasswords {
    pub admin: SecretString,
    pub demo: SecretString,
}

impl Default for OperatorPasswords {
    fn default() -> Self {
        Self {
            admin: SecretString::from(DEFAULT_OPERATOR_PASSWORD),
            demo: SecretString::from(DEFAULT_OPERATOR_PASSWORD),
        }
    }
}

impl std::fmt::Debug for OperatorPasswords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorPasswords")
            .field("admin", &"[REDACTED]")
            .field("demo", &"[REDACTED]")
            .finish()
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl HashingCost {
    /// The cheapest parameters Argon2 accepts. Only for tests.
    pub const MINIMAL: Self = Self {
        memory_kib: 8,
        iterations: 1,
    };
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(".bazaar/state.json"),
            latency: Latency::default(),
            otp: OtpConfig::default(),
            shipping: ShippingPolicy::default(),
            operators: OperatorPasswords::default(),
            hashing: HashingCost::default(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with no latency and the cheapest password hashing.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            latency: Latency::ZERO,
            hashing: HashingCost::MINIMAL,
            ..Self::default()
        }
    }

    /// Build a configuration from any variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let data_file = lookup("BAZAAR_DATA_FILE").map_or(defaults.data_file, PathBuf::from);

        let latency = Latency {
            standard: Duration::from_millis(parse_or(&lookup, "BAZAAR_LATENCY_MS", 1000)?),
            otp: Duration::from_millis(parse_or(&lookup, "BAZAAR_OTP_LATENCY_MS", 1500)?),
        };

        let otp = OtpConfig {
            mode: parse_or(&lookup, "BAZAAR_OTP_MODE", OtpMode::Format)?,
            ttl: Duration::from_secs(parse_or(&lookup, "BAZAAR_OTP_TTL_SECS", 300)?),
        };

        let free_above: Decimal =
            parse_or(&lookup, "BAZAAR_FREE_SHIPPING_ABOVE", Decimal::from(999))?;
        let flat_fee: Decimal = parse_or(&lookup, "BAZAAR_SHIPPING_FEE", Decimal::from(99))?;
        if flat_fee.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "BAZAAR_SHIPPING_FEE".to_string(),
                "must not be negative".to_string(),
            ));
        }
        let shipping = ShippingPolicy {
            free_above: Price::new(free_above, defaults.shipping.free_above.currency_code),
            flat_fee: Price::new(flat_fee, defaults.shipping.flat_fee.currency_code),
        };

        let operators = OperatorPasswords {
            admin: secret_or_default(&lookup, "BAZAAR_ADMIN_PASSWORD"),
            demo: secret_or_default(&lookup, "BAZAAR_DEMO_PASSWORD"),
        };

        let hashing = HashingCost {
            memory_kib: parse_or(&lookup, "BAZAAR_HASH_MEMORY_KIB", defaults.hashing.memory_kib)?,
            iterations: parse_or(&lookup, "BAZAAR_HASH_ITERATIONS", defaults.hashing.iterations)?,
        };

        Ok(Self {
            data_file,
            latency,
            otp,
            shipping,
            operators,
            hashing,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable, falling back to `default` when it is unset or blank.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        _ => Ok(default),
    }
}

/// Get a secret, falling back to the stock operator password.
fn secret_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> SecretString {
    lookup(key)
        .filter(|value| !value.is_empty())
        .map_or_else(
            || SecretString::from(DEFAULT_OPERATOR_PASSWORD),
            SecretString::from,
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StoreConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StoreConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.data_file, PathBuf::from(".bazaar/state.json"));
        assert_eq!(config.latency, Latency::default());
        assert_eq!(config.otp.mode, OtpMode::Format);
        assert_eq!(config.otp.ttl, Duration::from_secs(300));
        assert_eq!(config.shipping, ShippingPolicy::default());
        assert_eq!(config.operators.admin.expose_secret(), "password123");
        assert_eq!(config.hashing, HashingCost::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BAZAAR_DATA_FILE", "/tmp/state.json"),
            ("BAZAAR_LATENCY_MS", "0"),
            ("BAZAAR_OTP_MODE", "Issued"),
            ("BAZAAR_OTP_TTL_SECS", "60"),
            ("BAZAAR_FREE_SHIPPING_ABOVE", "499"),
            ("BAZAAR_ADMIN_PASSWORD", "hunter22"),
        ])
        .unwrap();
        assert_eq!(config.data_file, PathBuf::from("/tmp/state.json"));
        assert_eq!(config.latency.standard, Duration::ZERO);
        assert_eq!(config.latency.otp, Duration::from_millis(1500));
        assert_eq!(config.otp.mode, OtpMode::Issued);
        assert_eq!(config.otp.ttl, Duration::from_secs(60));
        assert_eq!(config.shipping.free_above, Price::inr(499));
        assert_eq!(config.operators.admin.expose_secret(), "hunter22");
        assert_eq!(config.operators.demo.expose_secret(), "password123");
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&[("BAZAAR_LATENCY_MS", "soon")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar(ref key, _) if key == "BAZAAR_LATENCY_MS"
        ));
    }

    #[test]
    fn test_invalid_otp_mode() {
        assert!(load(&[("BAZAAR_OTP_MODE", "sms")]).is_err());
    }

    #[test]
    fn test_negative_shipping_fee_rejected() {
        assert!(load(&[("BAZAAR_SHIPPING_FEE", "-1")]).is_err());
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let config = load(&[("BAZAAR_ADMIN_PASSWORD", "hunter22")]).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_instant() {
        let config = StoreConfig::instant();
        assert_eq!(config.latency, Latency::ZERO);
        assert_eq!(config.hashing, HashingCost::MINIMAL);
    }
}
