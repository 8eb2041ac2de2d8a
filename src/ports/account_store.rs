//! AccountStore port - the narrow slice of the external account record this
//! service reads and writes.

use async_trait::async_trait;

use crate::domain::assignment::ProfileMode;
use crate::domain::foundation::{DomainError, ProfileId, UserId};

/// Assignment-relevant fields of a user account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    pub user_id: UserId,
    pub mode: ProfileMode,
    pub assigned_profile_id: Option<ProfileId>,
}

/// Port onto the account service's user record.
///
/// Only `commit_assignment` writes, and it writes only the assigned profile
/// id. The mode is owned by the account lifecycle.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Returns `None` for unknown users.
    async fn find_account(&self, user_id: &UserId) -> Result<Option<AccountRecord>, DomainError>;

    /// Persist the committed profile id on the account.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the account vanished
    /// - `DatabaseError` on persistence failure
    async fn commit_assignment(
        &self,
        user_id: &UserId,
        profile_id: &ProfileId,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn AccountStore) {}
}
