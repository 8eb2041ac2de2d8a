//! PostgreSQL implementation of AccountStore over the account service's
//! `"user"` table.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::assignment::ProfileMode;
use crate::domain::foundation::{DomainError, ErrorCode, ProfileId, UserId};
use crate::ports::{AccountRecord, AccountStore};

/// PostgreSQL implementation of the AccountStore port.
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    user_id: String,
    profile_mode: String,
    predefined_profile_id: Option<String>,
}

impl TryFrom<AccountRow> for AccountRecord {
    type Error = DomainError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let invalid = |what: &str, e: String| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid {}: {}", what, e))
        };

        let mode = row
            .profile_mode
            .parse::<ProfileMode>()
            .map_err(|e| invalid("profile_mode", e.to_string()))?;

        // Blank ids are treated as "no assignment"
        let assigned_profile_id = row
            .predefined_profile_id
            .filter(|id| !id.trim().is_empty())
            .map(ProfileId::new)
            .transpose()
            .map_err(|e| invalid("predefined_profile_id", e.to_string()))?;

        Ok(AccountRecord {
            user_id: UserId::new(row.user_id).map_err(|e| invalid("user_id", e.to_string()))?,
            mode,
            assigned_profile_id,
        })
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn find_account(&self, user_id: &UserId) -> Result<Option<AccountRecord>, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT user_id, profile_mode::text AS profile_mode, predefined_profile_id
            FROM "user"
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find account: {}", e))
        })?;

        row.map(AccountRecord::try_from).transpose()
    }

    async fn commit_assignment(
        &self,
        user_id: &UserId,
        profile_id: &ProfileId,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(r#"UPDATE "user" SET predefined_profile_id = $2 WHERE user_id = $1"#)
            .bind(user_id.as_str())
            .bind(profile_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to commit assignment: {}", e),
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("User not found: {}", user_id),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(mode: &str, profile: Option<&str>) -> AccountRow {
        AccountRow {
            user_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            profile_mode: mode.to_string(),
            predefined_profile_id: profile.map(str::to_string),
        }
    }

    #[test]
    fn converts_row_with_assignment() {
        let record = AccountRecord::try_from(row("DRIFT_FALLBACK", Some("P3"))).unwrap();
        assert_eq!(record.mode, ProfileMode::DriftFallback);
        assert_eq!(record.assigned_profile_id.unwrap().as_str(), "P3");
    }

    #[test]
    fn blank_profile_id_is_unassigned() {
        let record = AccountRecord::try_from(row("COLD_START", Some(" "))).unwrap();
        assert!(record.assigned_profile_id.is_none());
    }

    #[test]
    fn unknown_mode_is_a_database_error() {
        let err = AccountRecord::try_from(row("LEGACY", None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
