//! PostgreSQL implementation of ProfileCatalog.
//!
//! Reads the account service's catalog tables. Association weights are
//! `NUMERIC(3,2)` and are cast to `float8` in SQL.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::domain::foundation::{DomainError, ErrorCode, ProfileId};
use crate::domain::matching::{
    ensure_unique_profile_ids, ProfileDefinition, WeightConfiguration, WeightSet,
    WeightedAssociation,
};
use crate::ports::ProfileCatalog;

/// PostgreSQL implementation of the ProfileCatalog port.
pub struct PostgresProfileCatalog {
    pool: PgPool,
}

impl PostgresProfileCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    profile_id: String,
    profile_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct AssociationRow {
    profile_id: String,
    name: String,
    weight: f64,
    is_primary: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct LevelRow {
    profile_id: String,
    level_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct FactorRow {
    factor_name: String,
    weight: f64,
}

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

impl PostgresProfileCatalog {
    async fn associations(&self, sql: &str, what: &str) -> Result<Vec<AssociationRow>, DomainError> {
        sqlx::query_as(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error(what, e))
    }

    async fn factors(&self, table: &str) -> Result<Vec<FactorRow>, DomainError> {
        let sql = format!(
            "SELECT factor_name, weight::float8 AS weight FROM {} ORDER BY factor_name",
            table
        );
        sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("load matching factors", e))
    }
}

/// Appends each association to its profile; rows for unknown profiles are dropped.
fn attach<F>(profiles: &mut [ProfileDefinition], index: &HashMap<String, usize>, rows: Vec<AssociationRow>, mut target: F)
where
    F: FnMut(&mut ProfileDefinition) -> &mut Vec<WeightedAssociation>,
{
    for row in rows {
        if let Some(&i) = index.get(&row.profile_id) {
            let mut association = WeightedAssociation::new(row.name, row.weight);
            association.primary = row.is_primary;
            target(&mut profiles[i]).push(association);
        }
    }
}

/// Builds the profile list in row order plus a `profile_id -> position` index.
fn index_profiles(
    rows: Vec<ProfileRow>,
) -> Result<(Vec<ProfileDefinition>, HashMap<String, usize>), DomainError> {
    let mut profiles = Vec::with_capacity(rows.len());
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        let id = ProfileId::new(&row.profile_id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid profile_id: {}", e))
        })?;
        index.insert(row.profile_id, profiles.len());
        profiles.push(ProfileDefinition::new(id, row.profile_name));
    }
    ensure_unique_profile_ids(&profiles).map_err(|e| {
        DomainError::new(
            ErrorCode::ConfigurationError,
            format!("Invalid profile catalog: {}", e),
        )
    })?;
    Ok((profiles, index))
}

/// Short tag identifying the weight rows in use, for logs.
fn weights_version(standard: &[FactorRow], cold_start: &[FactorRow]) -> String {
    let mut hasher = DefaultHasher::new();
    for (regime, rows) in [("standard", standard), ("cold_start", cold_start)] {
        regime.hash(&mut hasher);
        for row in rows {
            row.factor_name.to_uppercase().hash(&mut hasher);
            row.weight.to_bits().hash(&mut hasher);
        }
    }
    format!("db-{:016x}", hasher.finish())
}

#[async_trait]
impl ProfileCatalog for PostgresProfileCatalog {
    async fn load_profiles(&self) -> Result<Vec<ProfileDefinition>, DomainError> {
        let rows: Vec<ProfileRow> =
            sqlx::query_as("SELECT profile_id, profile_name FROM profile ORDER BY profile_id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_error("load profiles", e))?;

        let (mut profiles, index) = index_profiles(rows)?;

        let intents = self
            .associations(
                r#"
                SELECT pi.profile_id, i.intent_name AS name,
                       COALESCE(pi.weight, 1.0)::float8 AS weight,
                       COALESCE(pi.is_primary, FALSE) AS is_primary
                FROM profile_intent pi
                JOIN intent i ON i.intent_id = pi.intent_id
                ORDER BY pi.profile_id, i.intent_name
                "#,
                "load profile intents",
            )
            .await?;
        attach(&mut profiles, &index, intents, |p| &mut p.intents);

        let interests = self
            .associations(
                r#"
                SELECT pi.profile_id, ia.interest_name AS name,
                       COALESCE(pi.weight, 1.0)::float8 AS weight,
                       FALSE AS is_primary
                FROM profile_interest pi
                JOIN interest_area ia ON ia.interest_id = pi.interest_id
                ORDER BY pi.profile_id, ia.interest_name
                "#,
                "load profile interests",
            )
            .await?;
        attach(&mut profiles, &index, interests, |p| &mut p.interests);

        let signals = self
            .associations(
                r#"
                SELECT pbs.profile_id, bs.signal_name AS name,
                       COALESCE(pbs.weight, 1.0)::float8 AS weight,
                       FALSE AS is_primary
                FROM profile_behavior_signal pbs
                JOIN behavior_signal bs ON bs.signal_id = pbs.signal_id
                ORDER BY pbs.profile_id, bs.signal_name
                "#,
                "load profile signals",
            )
            .await?;
        attach(&mut profiles, &index, signals, |p| &mut p.signals);

        let levels: Vec<LevelRow> = sqlx::query_as(
            r#"
            SELECT pbl.profile_id, bl.level_name
            FROM profile_behavior_level pbl
            JOIN behavior_level bl ON bl.behavior_level_id = pbl.behavior_level_id
            ORDER BY pbl.profile_id, bl.level_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("load profile behavior levels", e))?;
        for row in levels {
            if let Some(&i) = index.get(&row.profile_id) {
                profiles[i].behavior_levels.push(row.level_name);
            }
        }

        tracing::debug!("Loaded {} profiles from catalog", profiles.len());
        Ok(profiles)
    }

    async fn load_weights(&self) -> Result<WeightConfiguration, DomainError> {
        let standard_rows = self.factors("matching_factor").await?;
        let cold_start_rows = self.factors("cold_start_matching_factor").await?;
        let version = weights_version(&standard_rows, &cold_start_rows);

        let (standard, unknown_standard) = WeightSet::standard()
            .overlay(standard_rows.iter().map(|r| (r.factor_name.as_str(), r.weight)))?;
        let (cold_start, unknown_cold) = WeightSet::cold_start()
            .overlay(cold_start_rows.iter().map(|r| (r.factor_name.as_str(), r.weight)))?;

        for name in unknown_standard.iter().chain(unknown_cold.iter()) {
            tracing::warn!("Ignoring unknown matching factor '{}'", name);
        }

        Ok(WeightConfiguration::new(version, standard, cold_start)?)
    }
}
