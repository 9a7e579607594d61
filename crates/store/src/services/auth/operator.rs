//! The two built-in accounts that exist without registering.

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;

use bazaar_core::{Email, PhoneNumber, UserId};

use crate::config::OperatorPasswords;
use crate::models::user::UserAccount;

/// Sign-in email of the store administrator.
pub const ADMIN_EMAIL: &str = "admin@ecommerce.com";

/// Sign-in email of the demo shopper.
pub const DEMO_EMAIL: &str = "user@demo.com";

// 2024-01-01T00:00:00Z
const CREATED_AT_SECS: i64 = 1_704_067_200;

struct Operator {
    id: u128,
    email: &'static str,
    name: &'static str,
    phone: &'static str,
    is_admin: bool,
}

const ADMIN: Operator = Operator {
    id: 1,
    email: ADMIN_EMAIL,
    name: "Admin User",
    phone: "9876543210",
    is_admin: true,
};

const DEMO: Operator = Operator {
    id: 2,
    email: DEMO_EMAIL,
    name: "Demo User",
    phone: "9876543211",
    is_admin: false,
};

impl Operator {
    fn account(&self) -> Option<UserAccount> {
        Some(UserAccount {
            id: UserId::reserved(self.id),
            email: Email::parse(self.email).ok()?,
            name: self.name.to_owned(),
            phone: PhoneNumber::parse(self.phone).ok(),
            address: None,
            date_of_birth: None,
            gender: None,
            is_admin: self.is_admin,
            is_verified: true,
            created_at: DateTime::<Utc>::from_timestamp(CREATED_AT_SECS, 0).unwrap_or_default(),
        })
    }
}

/// Whether `email` belongs to a built-in account.
pub fn is_operator_email(email: &Email) -> bool {
    [ADMIN.email, DEMO.email]
        .iter()
        .any(|e| email.as_str().eq_ignore_ascii_case(e))
}

/// Whether `phone` belongs to a built-in account.
pub fn is_operator_phone(phone: &PhoneNumber) -> bool {
    [ADMIN.phone, DEMO.phone].contains(&phone.as_str())
}

/// The built-in account for this email and password, if they match one.
pub fn authenticate(
    passwords: &OperatorPasswords,
    email: &Email,
    password: &str,
) -> Option<UserAccount> {
    [(&ADMIN, &passwords.admin), (&DEMO, &passwords.demo)]
        .into_iter()
        .find(|(operator, secret)| {
            email.as_str().eq_ignore_ascii_case(operator.email)
                && secret.expose_secret() == password
        })
        .and_then(|(operator, _)| operator.account())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticate_admin() {
        let passwords = OperatorPasswords::default();
        let email = Email::parse("Admin@Ecommerce.com").unwrap();
        let account = authenticate(&passwords, &email, "password123").unwrap();
        assert!(account.is_admin);
        assert_eq!(account.id, UserId::reserved(1));
        assert_eq!(account.name, "Admin User");
    }

    #[test]
    fn test_authenticate_demo_is_not_admin() {
        let passwords = OperatorPasswords::default();
        let email = Email::parse(DEMO_EMAIL).unwrap();
        let account = authenticate(&passwords, &email, "password123").unwrap();
        assert!(!account.is_admin);
        assert_eq!(account.phone.unwrap().as_str(), "9876543211");
    }

    #[test]
    fn test_wrong_password() {
        let passwords = OperatorPasswords::default();
        let email = Email::parse(ADMIN_EMAIL).unwrap();
        assert!(authenticate(&passwords, &email, "password124").is_none());
    }

    #[test]
    fn test_is_operator_email() {
        assert!(is_operator_email(&Email::parse("USER@demo.com").unwrap()));
        assert!(!is_operator_email(&Email::parse("user@demo.org").unwrap()));
    }

    #[test]
    fn test_is_operator_phone() {
        assert!(is_operator_phone(&PhoneNumber::parse("9876543210").unwrap()));
        assert!(is_operator_phone(&PhoneNumber::parse("9876543211").unwrap()));
        assert!(!is_operator_phone(&PhoneNumber::parse("9876543212").unwrap()));
    }
}
