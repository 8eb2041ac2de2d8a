//! In-memory account store.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use crate::domain::assignment::ProfileMode;
use crate::domain::foundation::{DomainError, ErrorCode, ProfileId, UserId};
use crate::ports::{AccountRecord, AccountStore};

#[derive(Debug, Deserialize)]
struct AccountSeed {
    #[serde(default)]
    accounts: Vec<AccountSeedEntry>,
}

#[derive(Debug, Deserialize)]
struct AccountSeedEntry {
    user_id: String,
    mode: ProfileMode,
}

/// Account records keyed by user id, for tests and local runs.
///
/// Seed file layout:
///
/// ```yaml
/// accounts:
///   - { user_id: 0b6f3c52-1e7d-4a8f-9c2b-5d4e6f7a8b90, mode: COLD_START }
///   - { user_id: 9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d, mode: DRIFT_FALLBACK }
/// ```
///
/// # Panics
///
/// Methods panic if the internal lock is poisoned.
#[derive(Debug)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<UserId, AccountRecord>>,
    commits: RwLock<Vec<(UserId, ProfileId)>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            commits: RwLock::new(Vec::new()),
        }
    }

    /// Parses a YAML account seed. Every account starts unassigned.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DomainError> {
        let seed: AccountSeed = serde_yaml::from_str(yaml).map_err(|e| {
            DomainError::new(
                ErrorCode::ConfigurationError,
                format!("Invalid account seed: {}", e),
            )
        })?;

        let store = Self::new();
        for entry in seed.accounts {
            let user_id = UserId::new(entry.user_id).map_err(|e| {
                DomainError::new(
                    ErrorCode::ConfigurationError,
                    format!("Invalid account seed: {}", e),
                )
            })?;
            store.insert(user_id, entry.mode);
        }
        Ok(store)
    }

    /// Reads and parses a YAML account seed file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            DomainError::new(
                ErrorCode::ConfigurationError,
                format!("Cannot read account seed {}: {}", path.display(), e),
            )
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn account_count(&self) -> usize {
        self.accounts
            .read()
            .expect("InMemoryAccountStore: lock poisoned")
            .len()
    }

    /// Registers an account in the given mode with no assignment.
    pub fn insert(&self, user_id: UserId, mode: ProfileMode) {
        self.accounts
            .write()
            .expect("InMemoryAccountStore: lock poisoned")
            .insert(
                user_id.clone(),
                AccountRecord {
                    user_id,
                    mode,
                    assigned_profile_id: None,
                },
            );
    }

    /// Changes the stored mode, as the account lifecycle would.
    pub fn set_mode(&self, user_id: &UserId, mode: ProfileMode) {
        if let Some(record) = self
            .accounts
            .write()
            .expect("InMemoryAccountStore: lock poisoned")
            .get_mut(user_id)
        {
            record.mode = mode;
        }
    }

    // === Test Helpers ===

    pub fn account(&self, user_id: &UserId) -> Option<AccountRecord> {
        self.accounts
            .read()
            .expect("InMemoryAccountStore: lock poisoned")
            .get(user_id)
            .cloned()
    }

    /// Every commit in call order.
    pub fn commits(&self) -> Vec<(UserId, ProfileId)> {
        self.commits
            .read()
            .expect("InMemoryAccountStore: lock poisoned")
            .clone()
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_account(&self, user_id: &UserId) -> Result<Option<AccountRecord>, DomainError> {
        Ok(self.account(user_id))
    }

    async fn commit_assignment(
        &self,
        user_id: &UserId,
        profile_id: &ProfileId,
    ) -> Result<(), DomainError> {
        let mut accounts = self
            .accounts
            .write()
            .expect("InMemoryAccountStore: lock poisoned");
        let record = accounts.get_mut(user_id).ok_or_else(|| {
            DomainError::new(ErrorCode::UserNotFound, format!("User not found: {}", user_id))
        })?;
        record.assigned_profile_id = Some(profile_id.clone());
        self.commits
            .write()
            .expect("InMemoryAccountStore: lock poisoned")
            .push((user_id.clone(), profile_id.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_sets_profile_and_keeps_mode() {
        let store = InMemoryAccountStore::new();
        let user = UserId::new("u").unwrap();
        store.insert(user.clone(), ProfileMode::DriftFallback);

        store
            .commit_assignment(&user, &ProfileId::new("P2").unwrap())
            .await
            .unwrap();

        let record = store.find_account(&user).await.unwrap().unwrap();
        assert_eq!(record.mode, ProfileMode::DriftFallback);
        assert_eq!(record.assigned_profile_id.unwrap().as_str(), "P2");
        assert_eq!(store.commits().len(), 1);
    }

    #[tokio::test]
    async fn unknown_user_is_none_and_cannot_commit() {
        let store = InMemoryAccountStore::new();
        let user = UserId::new("ghost").unwrap();
        assert!(store.find_account(&user).await.unwrap().is_none());
        let err = store
            .commit_assignment(&user, &ProfileId::new("P1").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn seed_registers_accounts_in_their_modes() {
        let yaml = "accounts:\n  - { user_id: u1, mode: COLD_START }\n  - { user_id: u2, mode: DRIFT_FALLBACK }\n";
        let store = InMemoryAccountStore::from_yaml_str(yaml).unwrap();

        assert_eq!(store.account_count(), 2);
        let record = store
            .find_account(&UserId::new("u2").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.mode, ProfileMode::DriftFallback);
        assert_eq!(record.assigned_profile_id, None);
    }

    #[test]
    fn blank_user_id_in_seed_is_configuration_error() {
        let yaml = "accounts:\n  - { user_id: '  ', mode: COLD_START }\n";
        let err = InMemoryAccountStore::from_yaml_str(yaml).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigurationError);
    }

    #[test]
    fn unknown_mode_in_seed_is_configuration_error() {
        let yaml = "accounts:\n  - { user_id: u1, mode: SOMETIMES }\n";
        let err = InMemoryAccountStore::from_yaml_str(yaml).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigurationError);
    }

    #[test]
    fn reads_seed_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"accounts:\n  - { user_id: u1, mode: COLD_START }\n")
            .unwrap();
        let store = InMemoryAccountStore::from_yaml_file(file.path()).unwrap();
        assert_eq!(store.account_count(), 1);
    }
}
