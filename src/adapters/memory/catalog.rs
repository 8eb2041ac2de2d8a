//! In-memory profile catalog, optionally seeded from a YAML file.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::matching::{
    ensure_unique_profile_ids, ProfileDefinition, WeightConfiguration, WeightSet,
};
use crate::ports::ProfileCatalog;

#[derive(Debug, Deserialize)]
struct CatalogSeed {
    #[serde(default)]
    weights: Option<WeightSeed>,
    profiles: Vec<ProfileDefinition>,
}

#[derive(Debug, Deserialize)]
struct WeightSeed {
    version: String,
    #[serde(default = "WeightSet::standard")]
    standard: WeightSet,
    #[serde(default = "WeightSet::cold_start")]
    cold_start: WeightSet,
}

/// Immutable catalog held in memory.
///
/// Seed file layout:
///
/// ```yaml
/// weights:            # optional, built-in tables when absent
///   version: seed-v1
///   standard: { intent: 0.35, interest: 0.25, complexity: 0.15, style: 0.15, consistency: 0.10 }
///   cold_start: { intent: 0.6, interest: 0.4 }
/// profiles:
///   - id: P1
///     name: Learner
///     intents: [{ name: LEARNING, weight: 1.0, primary: true }]
///     interests: [{ name: PROGRAMMING, weight: 0.3 }]
///     behavior_levels: [BEGINNER]
///     signals: []
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryProfileCatalog {
    profiles: Vec<ProfileDefinition>,
    weights: WeightConfiguration,
}

impl InMemoryProfileCatalog {
    pub fn new(profiles: Vec<ProfileDefinition>, weights: WeightConfiguration) -> Self {
        Self { profiles, weights }
    }

    /// Catalog with the built-in weight tables.
    pub fn with_profiles(profiles: Vec<ProfileDefinition>) -> Self {
        Self::new(profiles, WeightConfiguration::default())
    }

    /// Parses a YAML seed document. Profile ids must be unique.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DomainError> {
        let seed: CatalogSeed = serde_yaml::from_str(yaml).map_err(|e| {
            DomainError::new(
                ErrorCode::ConfigurationError,
                format!("Invalid catalog seed: {}", e),
            )
        })?;
        ensure_unique_profile_ids(&seed.profiles).map_err(|e| {
            DomainError::new(
                ErrorCode::ConfigurationError,
                format!("Invalid catalog seed: {}", e),
            )
        })?;

        let weights = match seed.weights {
            Some(w) => WeightConfiguration::new(w.version, w.standard, w.cold_start)
                .map_err(|e| DomainError::new(ErrorCode::ConfigurationError, e.to_string()))?,
            None => WeightConfiguration::default(),
        };

        Ok(Self::new(seed.profiles, weights))
    }

    /// Reads and parses a YAML seed file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            DomainError::new(
                ErrorCode::ConfigurationError,
                format!("Cannot read catalog seed {}: {}", path.display(), e),
            )
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }
}

#[async_trait]
impl ProfileCatalog for InMemoryProfileCatalog {
    async fn load_profiles(&self) -> Result<Vec<ProfileDefinition>, DomainError> {
        Ok(self.profiles.clone())
    }

    async fn load_weights(&self) -> Result<WeightConfiguration, DomainError> {
        Ok(self.weights.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SEED: &str = r#"
weights:
  version: seed-v2
  standard: { intent: 0.5, interest: 0.5 }
profiles:
  - id: P1
    name: Learner
    intents:
      - { name: LEARNING, weight: 1.0, primary: true }
    interests:
      - { name: PROGRAMMING, weight: 0.3 }
  - id: P3
    name: Problem Solver
    intents:
      - { name: PROBLEM_SOLVING, weight: 1.0 }
"#;

    #[tokio::test]
    async fn loads_profiles_in_seed_order() {
        let catalog = InMemoryProfileCatalog::from_yaml_str(SEED).unwrap();
        let profiles = catalog.load_profiles().await.unwrap();
        let ids: Vec<_> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P3"]);
        assert!(profiles[0].intents[0].primary);
    }

    #[tokio::test]
    async fn seed_weights_override_defaults_per_set() {
        let catalog = InMemoryProfileCatalog::from_yaml_str(SEED).unwrap();
        let weights = catalog.load_weights().await.unwrap();
        assert_eq!(weights.version(), "seed-v2");
        assert_eq!(weights.standard().intent, 0.5);
        assert_eq!(weights.standard().style, 0.0);
        assert_eq!(weights.cold_start().intent, 0.60);
    }

    #[tokio::test]
    async fn missing_weights_use_builtin_tables() {
        let catalog =
            InMemoryProfileCatalog::from_yaml_str("profiles:\n  - id: P1\n    name: A\n").unwrap();
        let weights = catalog.load_weights().await.unwrap();
        assert_eq!(weights.version(), WeightConfiguration::BUILTIN_VERSION);
    }

    #[test]
    fn negative_seed_weight_is_configuration_error() {
        let yaml = "weights:\n  version: bad\n  standard: { intent: -1.0 }\nprofiles: []\n";
        let err = InMemoryProfileCatalog::from_yaml_str(yaml).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigurationError);
    }

    #[test]
    fn duplicate_profile_id_in_seed_is_configuration_error() {
        let yaml = "profiles:\n  - id: P1\n    name: A\n  - id: P2\n    name: B\n  - id: P1\n    name: C\n";
        let err = InMemoryProfileCatalog::from_yaml_str(yaml).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigurationError);
        assert!(err.message.contains("duplicate profile id P1"));
    }

    #[test]
    fn reads_seed_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();
        let catalog = InMemoryProfileCatalog::from_yaml_file(file.path()).unwrap();
        assert_eq!(catalog.profile_count(), 2);
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let err = InMemoryProfileCatalog::from_yaml_file("/nonexistent/catalog.yaml").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigurationError);
    }
}
