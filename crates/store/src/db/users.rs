//! Registered-users directory.
//!
//! The directory is the durable list of verified accounts. Pending sign-ups
//! never enter it; [`crate::services::auth::SessionStore`] appends an account
//! only after its OTP is accepted.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use bazaar_core::{Email, PasswordDigest, PhoneNumber};

use super::{KeyValueStore, RepositoryError, get_json, set_json};
use crate::models::session::keys;
use crate::models::user::UserAccount;

/// A verified account together with its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(flatten)]
    pub account: UserAccount,
    pub password_hash: PasswordDigest,
}

/// Storage for verified accounts.
///
/// Emails compare case-insensitively; phones compare on their ten digits.
pub trait UserDirectory: Send + Sync {
    /// Find an entry whose email or phone matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the directory cannot be read.
    fn find_by_email_or_phone(
        &self,
        email: &Email,
        phone: Option<&PhoneNumber>,
    ) -> Result<Option<DirectoryEntry>, RepositoryError>;

    /// Find an entry by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the directory cannot be read.
    fn find_by_email(&self, email: &Email) -> Result<Option<DirectoryEntry>, RepositoryError> {
        self.find_by_email_or_phone(email, None)
    }

    /// Add a new entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or phone is taken.
    fn append(&self, entry: DirectoryEntry) -> Result<(), RepositoryError>;

    /// Replace the account fields of the entry with the same ID, keeping its
    /// password hash. Returns whether an entry was found.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the directory cannot be written.
    fn update_by_id(&self, account: &UserAccount) -> Result<bool, RepositoryError>;

    /// All accounts, in registration order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the directory cannot be read.
    fn list(&self) -> Result<Vec<UserAccount>, RepositoryError>;
}

/// A `UserDirectory` kept as one JSON array in a key-value store.
#[derive(Clone)]
pub struct KvUserDirectory {
    store: Arc<dyn KeyValueStore>,
}

impl KvUserDirectory {
    /// Create a directory over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn load(&self) -> Result<Vec<DirectoryEntry>, RepositoryError> {
        Ok(get_json(self.store.as_ref(), keys::REGISTERED_USERS)?.unwrap_or_default())
    }

    fn save(&self, entries: &[DirectoryEntry]) -> Result<(), RepositoryError> {
        set_json(self.store.as_ref(), keys::REGISTERED_USERS, entries)
    }
}

fn same_email(a: &Email, b: &Email) -> bool {
    a.as_str().eq_ignore_ascii_case(b.as_str())
}

fn entry_matches(entry: &DirectoryEntry, email: &Email, phone: Option<&PhoneNumber>) -> bool {
    same_email(&entry.account.email, email)
        || phone.is_some_and(|p| entry.account.phone.as_ref() == Some(p))
}

impl UserDirectory for KvUserDirectory {
    fn find_by_email_or_phone(
        &self,
        email: &Email,
        phone: Option<&PhoneNumber>,
    ) -> Result<Option<DirectoryEntry>, RepositoryError> {
        Ok(self
            .load()?
            .into_iter()
            .find(|entry| entry_matches(entry, email, phone)))
    }

    fn append(&self, entry: DirectoryEntry) -> Result<(), RepositoryError> {
        let mut entries = self.load()?;
        let account = &entry.account;
        if entries.iter().any(|e| {
            e.account.id == account.id
                || entry_matches(e, &account.email, account.phone.as_ref())
        }) {
            return Err(RepositoryError::Conflict(format!(
                "account already exists for {}",
                account.email
            )));
        }
        debug!(user_id = %account.id, "appending account to directory");
        entries.push(entry);
        self.save(&entries)
    }

    fn update_by_id(&self, account: &UserAccount) -> Result<bool, RepositoryError> {
        let mut entries = self.load()?;
        let Some(entry) = entries.iter_mut().find(|e| e.account.id == account.id) else {
            return Ok(false);
        };
        entry.account = account.clone();
        self.save(&entries)?;
        Ok(true)
    }

    fn list(&self) -> Result<Vec<UserAccount>, RepositoryError> {
        Ok(self.load()?.into_iter().map(|e| e.account).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use bazaar_core::UserId;

    use super::*;
    use crate::db::MemoryStore;

    fn entry(email: &str, phone: &str) -> DirectoryEntry {
        DirectoryEntry {
            account: UserAccount {
                id: UserId::generate(),
                email: Email::parse(email).unwrap(),
                name: "Test".to_owned(),
                phone: Some(PhoneNumber::parse(phone).unwrap()),
                address: None,
                date_of_birth: None,
                gender: None,
                is_admin: false,
                is_verified: true,
                created_at: Utc::now(),
            },
            password_hash: PasswordDigest::new("$argon2id$stub".to_owned()),
        }
    }

    fn directory() -> KvUserDirectory {
        KvUserDirectory::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_append_and_find() {
        let dir = directory();
        let e = entry("a@x.com", "9999999999");
        dir.append(e.clone()).unwrap();

        let by_email = dir.find_by_email(&Email::parse("A@X.com").unwrap()).unwrap();
        assert_eq!(by_email, Some(e.clone()));

        let other = Email::parse("other@x.com").unwrap();
        let phone = PhoneNumber::parse("9999999999").unwrap();
        let by_phone = dir.find_by_email_or_phone(&other, Some(&phone)).unwrap();
        assert_eq!(by_phone.map(|e| e.account.id), Some(e.account.id));
        assert!(dir.find_by_email(&other).unwrap().is_none());
    }

    #[test]
    fn test_append_rejects_duplicate_email_or_phone() {
        let dir = directory();
        dir.append(entry("a@x.com", "9999999999")).unwrap();

        let same_email = dir.append(entry("a@x.com", "8888888888"));
        assert!(matches!(same_email, Err(RepositoryError::Conflict(_))));

        let same_phone = dir.append(entry("b@x.com", "9999999999"));
        assert!(matches!(same_phone, Err(RepositoryError::Conflict(_))));

        assert_eq!(dir.list().unwrap().len(), 1);
    }

    #[test]
    fn test_update_by_id_keeps_hash() {
        let dir = directory();
        let e = entry("a@x.com", "9999999999");
        dir.append(e.clone()).unwrap();

        let mut account = e.account.clone();
        account.name = "Renamed".to_owned();
        assert!(dir.update_by_id(&account).unwrap());

        let stored = dir.find_by_email(&account.email).unwrap().unwrap();
        assert_eq!(stored.account.name, "Renamed");
        assert_eq!(stored.password_hash, e.password_hash);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let dir = directory();
        let e = entry("a@x.com", "9999999999");
        assert!(!dir.update_by_id(&e.account).unwrap());
        assert!(dir.list().unwrap().is_empty());
    }
}
