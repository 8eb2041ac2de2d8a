//! Behavior observation - the interpreted signal of one user prompt.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::ValidationError;

/// Neutral value used for complexity and consistency when the upstream
/// interpretation did not provide one.
pub const NEUTRAL_SCALAR: f64 = 0.5;

/// One interpreted user prompt.
///
/// Every field is optional on the wire. Missing maps become empty, a missing
/// behavior level becomes the empty label, and missing scalars become
/// [`NEUTRAL_SCALAR`]. Explicit `null` is treated the same as absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorObservation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub intents: HashMap<String, f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub interests: HashMap<String, f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub behavior_level: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub signals: HashMap<String, f64>,

    #[serde(default = "neutral", deserialize_with = "null_as_neutral")]
    pub complexity: f64,

    #[serde(default = "neutral", deserialize_with = "null_as_neutral")]
    pub consistency: f64,
}

impl Default for BehaviorObservation {
    fn default() -> Self {
        Self {
            intents: HashMap::new(),
            interests: HashMap::new(),
            behavior_level: String::new(),
            signals: HashMap::new(),
            complexity: NEUTRAL_SCALAR,
            consistency: NEUTRAL_SCALAR,
        }
    }
}

impl BehaviorObservation {
    /// Adds an intent affinity.
    pub fn with_intent(mut self, name: impl Into<String>, affinity: f64) -> Self {
        self.intents.insert(name.into(), affinity);
        self
    }

    /// Adds an interest-domain affinity.
    pub fn with_interest(mut self, name: impl Into<String>, affinity: f64) -> Self {
        self.interests.insert(name.into(), affinity);
        self
    }

    /// Adds a style-signal affinity.
    pub fn with_signal(mut self, name: impl Into<String>, affinity: f64) -> Self {
        self.signals.insert(name.into(), affinity);
        self
    }

    /// Sets the behavior-level label.
    pub fn with_behavior_level(mut self, level: impl Into<String>) -> Self {
        self.behavior_level = level.into();
        self
    }

    /// Sets complexity and consistency.
    pub fn with_scalars(mut self, complexity: f64, consistency: f64) -> Self {
        self.complexity = complexity;
        self.consistency = consistency;
        self
    }

    /// Checks that every affinity and scalar is a finite value in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_unit("complexity", self.complexity)?;
        check_unit("consistency", self.consistency)?;
        for (group, map) in [
            ("intents", &self.intents),
            ("interests", &self.interests),
            ("signals", &self.signals),
        ] {
            for (name, value) in map {
                if name.trim().is_empty() {
                    return Err(ValidationError::empty_field(format!("{}.<key>", group)));
                }
                check_unit(&format!("{}.{}", group, name), *value)?;
            }
        }
        Ok(())
    }
}

fn check_unit(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::out_of_range(field, 0.0, 1.0, value));
    }
    Ok(())
}

fn neutral() -> f64 {
    NEUTRAL_SCALAR
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_neutral<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(NEUTRAL_SCALAR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_neutral_defaults() {
        let obs: BehaviorObservation = serde_json::from_str("{}").unwrap();
        assert!(obs.intents.is_empty());
        assert!(obs.interests.is_empty());
        assert!(obs.signals.is_empty());
        assert_eq!(obs.behavior_level, "");
        assert_eq!(obs.complexity, 0.5);
        assert_eq!(obs.consistency, 0.5);
    }

    #[test]
    fn explicit_nulls_are_treated_as_missing() {
        let obs: BehaviorObservation = serde_json::from_str(
            r#"{"intents": null, "behavior_level": null, "complexity": null}"#,
        )
        .unwrap();
        assert!(obs.intents.is_empty());
        assert_eq!(obs.behavior_level, "");
        assert_eq!(obs.complexity, 0.5);
    }

    #[test]
    fn parses_full_observation() {
        let obs: BehaviorObservation = serde_json::from_str(
            r#"{
                "intents": {"PROBLEM_SOLVING": 0.9},
                "interests": {"PROGRAMMING": 0.8},
                "behavior_level": "INTERMEDIATE",
                "signals": {"CONCISE": 0.4},
                "complexity": 0.7,
                "consistency": 0.6
            }"#,
        )
        .unwrap();
        assert_eq!(obs.intents.get("PROBLEM_SOLVING"), Some(&0.9));
        assert_eq!(obs.behavior_level, "INTERMEDIATE");
        assert_eq!(obs.complexity, 0.7);
    }

    #[test]
    fn validate_accepts_unit_values() {
        let obs = BehaviorObservation::default()
            .with_intent("LEARNING", 1.0)
            .with_interest("PROGRAMMING", 0.0)
            .with_scalars(0.0, 1.0);
        assert!(obs.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_affinity() {
        let obs = BehaviorObservation::default().with_signal("VERBOSE", 1.2);
        let err = obs.validate().unwrap_err();
        assert_eq!(err.field(), "signals.VERBOSE");
    }

    #[test]
    fn validate_rejects_non_finite_scalar() {
        let obs = BehaviorObservation::default().with_scalars(f64::NAN, 0.5);
        assert!(obs.validate().is_err());
    }
}
