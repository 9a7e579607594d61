//! Field-level validators for the login, sign-up and profile forms.
//!
//! These are pure functions so a form can report every problem before it
//! calls into a store. The stores run the same checks again on their own
//! input, so skipping them here is safe but gives worse messages.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{Email, OtpCode, PhoneNumber, Pincode};

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A problem with one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Form field name, dotted for nested fields (`address.pincode`).
    pub field: String,
    /// Human-readable message for the form.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every failing field of a form, in the order they were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(Vec<ValidationError>);

impl FieldErrors {
    /// An empty error set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Add an error.
    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Record the error of `result`, if any, and pass its value through.
    pub fn check<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.push(e);
                None
            }
        }
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }
}

impl From<ValidationError> for FieldErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

// =============================================================================
// Single-field validators
// =============================================================================

/// Validate an email address.
///
/// # Errors
///
/// Returns a `ValidationError` for field `email`.
pub fn validate_email(input: &str) -> Result<Email, ValidationError> {
    Email::parse(input).map_err(|e| ValidationError::new("email", e.to_string()))
}

/// Validate a new password.
///
/// # Errors
///
/// Returns a `ValidationError` for field `password` when it is empty or
/// shorter than [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(input: &str) -> Result<(), ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::new("password", "password is required"));
    }
    if input.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new(
            "password",
            format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Validate that the confirmation matches the password.
///
/// # Errors
///
/// Returns a `ValidationError` for field `confirm_password`.
pub fn validate_password_confirmation(
    password: &str,
    confirmation: &str,
) -> Result<(), ValidationError> {
    if confirmation.is_empty() {
        return Err(ValidationError::new(
            "confirm_password",
            "please confirm your password",
        ));
    }
    if password != confirmation {
        return Err(ValidationError::new(
            "confirm_password",
            "passwords do not match",
        ));
    }
    Ok(())
}

/// Validate a display name. Returns it trimmed.
///
/// # Errors
///
/// Returns a `ValidationError` for field `name` when it is blank.
pub fn validate_name(input: &str) -> Result<String, ValidationError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(ValidationError::new("name", "name is required"));
    }
    Ok(name.to_owned())
}

/// Validate a mobile number.
///
/// # Errors
///
/// Returns a `ValidationError` for field `phone`.
pub fn validate_phone(input: &str) -> Result<PhoneNumber, ValidationError> {
    PhoneNumber::parse(input).map_err(|e| ValidationError::new("phone", e.to_string()))
}

/// Validate a postal code.
///
/// # Errors
///
/// Returns a `ValidationError` for field `address.pincode`.
pub fn validate_pincode(input: &str) -> Result<Pincode, ValidationError> {
    Pincode::parse(input).map_err(|e| ValidationError::new("address.pincode", e.to_string()))
}

/// Validate a one-time passcode as typed.
///
/// # Errors
///
/// Returns a `ValidationError` for field `otp`.
pub fn validate_otp(input: &str) -> Result<OtpCode, ValidationError> {
    OtpCode::parse(input).map_err(|e| ValidationError::new("otp", e.to_string()))
}

// =============================================================================
// Forms
// =============================================================================

/// Raw sign-up form input.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub phone: &'a str,
    /// `None` when the caller has no confirmation field.
    pub confirm_password: Option<&'a str>,
}

/// Sign-up input that passed every check.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub email: Email,
    pub name: String,
    pub phone: PhoneNumber,
}

impl RegistrationForm<'_> {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns all failing fields at once.
    pub fn validate(&self) -> Result<ValidRegistration, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = errors.check(validate_email(self.email));
        errors.check(validate_password(self.password));
        let name = errors.check(validate_name(self.name));
        let phone = errors.check(validate_phone(self.phone));
        if let Some(confirmation) = self.confirm_password {
            errors.check(validate_password_confirmation(self.password, confirmation));
        }

        match (email, name, phone) {
            (Some(email), Some(name), Some(phone)) if errors.is_empty() => {
                Ok(ValidRegistration { email, name, phone })
            }
            _ => Err(errors),
        }
    }
}

/// Raw login form input.
#[derive(Debug, Clone, Default)]
pub struct LoginForm<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl LoginForm<'_> {
    /// Check both fields are present and the email is well formed.
    ///
    /// Password length is not enforced at login; a short password simply
    /// fails to match.
    ///
    /// # Errors
    ///
    /// Returns all failing fields at once.
    pub fn validate(&self) -> Result<Email, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = errors.check(validate_email(self.email));
        if self.password.is_empty() {
            errors.push(ValidationError::new("password", "password is required"));
        }
        match email {
            Some(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_rules() {
        assert!(validate_password("secret").is_ok());
        assert_eq!(
            validate_password("").unwrap_err().message,
            "password is required"
        );
        assert_eq!(
            validate_password("12345").unwrap_err().message,
            "password must be at least 6 characters"
        );
    }

    #[test]
    fn test_validate_password_confirmation() {
        assert!(validate_password_confirmation("secret1", "secret1").is_ok());
        assert_eq!(
            validate_password_confirmation("secret1", "secret2")
                .unwrap_err()
                .message,
            "passwords do not match"
        );
        assert!(validate_password_confirmation("secret1", "").is_err());
    }

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("  Asha  ").unwrap(), "Asha");
        assert_eq!(validate_name("   ").unwrap_err().field, "name");
    }

    #[test]
    fn test_validate_pincode_field_name() {
        assert_eq!(validate_pincode("12").unwrap_err().field, "address.pincode");
        assert!(validate_pincode("400001").is_ok());
    }

    #[test]
    fn test_registration_form_collects_all_errors() {
        let form = RegistrationForm {
            email: "not-an-email",
            password: "123",
            name: "",
            phone: "12345",
            confirm_password: Some("456"),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.get("email").is_some());
        assert!(errors.get("password").is_some());
        assert!(errors.get("name").is_some());
        assert_eq!(
            errors.get("phone"),
            Some("please enter a valid Indian mobile number")
        );
        assert_eq!(errors.get("confirm_password"), Some("passwords do not match"));
    }

    #[test]
    fn test_registration_form_valid() {
        let form = RegistrationForm {
            email: "a@x.com",
            password: "secret1",
            name: "Asha",
            phone: "9999999999",
            confirm_password: Some("secret1"),
        };
        let valid = form.validate().unwrap();
        assert_eq!(valid.email.as_str(), "a@x.com");
        assert_eq!(valid.phone.as_str(), "9999999999");
    }

    #[test]
    fn test_login_form() {
        let ok = LoginForm {
            email: "user@demo.com",
            password: "x",
        };
        assert!(ok.validate().is_ok());

        let missing = LoginForm {
            email: "",
            password: "",
        };
        assert_eq!(missing.validate().unwrap_err().len(), 2);
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        errors.push(ValidationError::new("name", "name is required"));
        errors.push(ValidationError::new("phone", "phone number is required"));
        assert_eq!(
            errors.to_string(),
            "name: name is required; phone: phone number is required"
        );
    }
}
