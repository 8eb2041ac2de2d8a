//! Predefined profile definitions (read-only reference data).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::{ProfileId, ValidationError};

/// A weighted association between a profile and a named attribute
/// (intent, interest domain, or style signal).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedAssociation {
    pub name: String,
    pub weight: f64,
    /// Informational only; never changes scoring.
    #[serde(default)]
    pub primary: bool,
}

impl WeightedAssociation {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            primary: false,
        }
    }
}

/// A predefined behavioral profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDefinition {
    pub id: ProfileId,
    pub name: String,
    #[serde(default)]
    pub intents: Vec<WeightedAssociation>,
    #[serde(default)]
    pub interests: Vec<WeightedAssociation>,
    /// Behavior-level labels this profile qualifies for.
    #[serde(default)]
    pub behavior_levels: Vec<String>,
    #[serde(default)]
    pub signals: Vec<WeightedAssociation>,
}

impl ProfileDefinition {
    /// Creates a profile with no associations.
    pub fn new(id: ProfileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            intents: Vec::new(),
            interests: Vec::new(),
            behavior_levels: Vec::new(),
            signals: Vec::new(),
        }
    }

    pub fn with_intent(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.intents.push(WeightedAssociation::new(name, weight));
        self
    }

    /// Adds an intent association flagged as the profile's primary intent.
    pub fn with_primary_intent(mut self, name: impl Into<String>, weight: f64) -> Self {
        let mut association = WeightedAssociation::new(name, weight);
        association.primary = true;
        self.intents.push(association);
        self
    }

    pub fn with_interest(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.interests.push(WeightedAssociation::new(name, weight));
        self
    }

    pub fn with_behavior_level(mut self, level: impl Into<String>) -> Self {
        self.behavior_levels.push(level.into());
        self
    }

    pub fn with_signal(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.signals.push(WeightedAssociation::new(name, weight));
        self
    }

    /// Whether the given behavior-level label is one this profile qualifies for.
    pub fn qualifies_for_level(&self, level: &str) -> bool {
        self.behavior_levels.iter().any(|l| l == level)
    }
}

/// Rejects a catalog in which two profiles share an id.
pub fn ensure_unique_profile_ids(profiles: &[ProfileDefinition]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(profiles.len());
    for profile in profiles {
        if !seen.insert(profile.id.as_str()) {
            return Err(ValidationError::invalid_format(
                "profiles",
                format!("duplicate profile id {}", profile.id),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_associations() {
        let profile = ProfileDefinition::new(ProfileId::new("P1").unwrap(), "Learner")
            .with_primary_intent("LEARNING", 1.0)
            .with_interest("PROGRAMMING", 0.3)
            .with_behavior_level("BEGINNER")
            .with_signal("CURIOUS", 0.5);

        assert_eq!(profile.intents.len(), 1);
        assert!(profile.intents[0].primary);
        assert_eq!(profile.interests[0].weight, 0.3);
        assert!(profile.qualifies_for_level("BEGINNER"));
        assert!(!profile.qualifies_for_level("ADVANCED"));
    }

    #[test]
    fn deserializes_with_missing_association_lists() {
        let profile: ProfileDefinition =
            serde_yaml::from_str("id: P2\nname: Builder\nintents:\n  - name: BUILDING\n    weight: 0.9\n")
                .unwrap();
        assert_eq!(profile.id.as_str(), "P2");
        assert_eq!(profile.intents[0].name, "BUILDING");
        assert!(!profile.intents[0].primary);
        assert!(profile.signals.is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let p1 = ProfileDefinition::new(ProfileId::new("P1").unwrap(), "Learner");
        let p2 = ProfileDefinition::new(ProfileId::new("P2").unwrap(), "Builder");
        assert!(ensure_unique_profile_ids(&[p1.clone(), p2.clone()]).is_ok());

        let err = ensure_unique_profile_ids(&[p1.clone(), p2, p1]).unwrap_err();
        assert_eq!(err.field(), "profiles");
        assert!(err.to_string().contains("P1"));
    }
}
