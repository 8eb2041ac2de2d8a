//! Matching factor weights.
//!
//! A [`WeightConfiguration`] is immutable once built. It is resolved once per
//! assignment request and passed by reference into every matching call, so a
//! single request never mixes two weight tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Factors that contribute to a profile's raw score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchingFactor {
    Intent,
    Interest,
    Complexity,
    Style,
    Consistency,
    BehaviorLevel,
}

impl MatchingFactor {
    pub const ALL: [MatchingFactor; 6] = [
        MatchingFactor::Intent,
        MatchingFactor::Interest,
        MatchingFactor::Complexity,
        MatchingFactor::Style,
        MatchingFactor::Consistency,
        MatchingFactor::BehaviorLevel,
    ];

    /// Stored factor name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchingFactor::Intent => "INTENT",
            MatchingFactor::Interest => "INTEREST",
            MatchingFactor::Complexity => "COMPLEXITY",
            MatchingFactor::Style => "STYLE",
            MatchingFactor::Consistency => "CONSISTENCY",
            MatchingFactor::BehaviorLevel => "BEHAVIOR_LEVEL",
        }
    }
}

impl fmt::Display for MatchingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MatchingFactor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INTENT" => Ok(MatchingFactor::Intent),
            "INTEREST" => Ok(MatchingFactor::Interest),
            "COMPLEXITY" => Ok(MatchingFactor::Complexity),
            "STYLE" => Ok(MatchingFactor::Style),
            "CONSISTENCY" => Ok(MatchingFactor::Consistency),
            "BEHAVIOR_LEVEL" => Ok(MatchingFactor::BehaviorLevel),
            other => Err(ValidationError::invalid_format(
                "factor_name",
                format!("unknown matching factor '{}'", other),
            )),
        }
    }
}

/// Which weight set a matching call uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightRegime {
    Standard,
    ColdStart,
}

/// One named set of factor weights.
///
/// Weights are non-negative and need not sum to one; normalization happens
/// over profile scores, not over weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightSet {
    #[serde(default)]
    pub intent: f64,
    #[serde(default)]
    pub interest: f64,
    #[serde(default)]
    pub complexity: f64,
    #[serde(default)]
    pub style: f64,
    #[serde(default)]
    pub consistency: f64,
    #[serde(default)]
    pub behavior_level: f64,
}

impl WeightSet {
    /// Default weights once enough evidence exists.
    pub fn standard() -> Self {
        Self {
            intent: 0.35,
            interest: 0.25,
            complexity: 0.15,
            style: 0.15,
            consistency: 0.10,
            behavior_level: 0.0,
        }
    }

    /// Default weights for the evidence-scarce phase: intent and interest only.
    pub fn cold_start() -> Self {
        Self {
            intent: 0.60,
            interest: 0.40,
            complexity: 0.0,
            style: 0.0,
            consistency: 0.0,
            behavior_level: 0.0,
        }
    }

    pub fn get(&self, factor: MatchingFactor) -> f64 {
        match factor {
            MatchingFactor::Intent => self.intent,
            MatchingFactor::Interest => self.interest,
            MatchingFactor::Complexity => self.complexity,
            MatchingFactor::Style => self.style,
            MatchingFactor::Consistency => self.consistency,
            MatchingFactor::BehaviorLevel => self.behavior_level,
        }
    }

    /// Returns a copy with one factor replaced.
    pub fn with(mut self, factor: MatchingFactor, weight: f64) -> Result<Self, ValidationError> {
        check_weight(factor, weight)?;
        match factor {
            MatchingFactor::Intent => self.intent = weight,
            MatchingFactor::Interest => self.interest = weight,
            MatchingFactor::Complexity => self.complexity = weight,
            MatchingFactor::Style => self.style = weight,
            MatchingFactor::Consistency => self.consistency = weight,
            MatchingFactor::BehaviorLevel => self.behavior_level = weight,
        }
        Ok(self)
    }

    /// Overlays stored `(factor_name, weight)` rows onto this set.
    ///
    /// Returns the resulting set and the names that matched no known factor.
    pub fn overlay<I, S>(self, rows: I) -> Result<(Self, Vec<String>), ValidationError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut set = self;
        let mut unknown = Vec::new();
        for (name, weight) in rows {
            match name.as_ref().parse::<MatchingFactor>() {
                Ok(factor) => set = set.with(factor, weight)?,
                Err(_) => unknown.push(name.as_ref().to_string()),
            }
        }
        Ok((set, unknown))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for factor in MatchingFactor::ALL {
            check_weight(factor, self.get(factor))?;
        }
        Ok(())
    }
}

fn check_weight(factor: MatchingFactor, weight: f64) -> Result<(), ValidationError> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(ValidationError::out_of_range(
            factor.as_str(),
            0.0,
            f64::MAX,
            weight,
        ));
    }
    Ok(())
}

/// Version-tagged pair of weight sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightConfiguration {
    version: String,
    standard: WeightSet,
    cold_start: WeightSet,
}

impl WeightConfiguration {
    pub const BUILTIN_VERSION: &'static str = "builtin-v1";

    /// Builds a configuration, rejecting negative or non-finite weights.
    pub fn new(
        version: impl Into<String>,
        standard: WeightSet,
        cold_start: WeightSet,
    ) -> Result<Self, ValidationError> {
        standard.validate()?;
        cold_start.validate()?;
        Ok(Self {
            version: version.into(),
            standard,
            cold_start,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn standard(&self) -> &WeightSet {
        &self.standard
    }

    pub fn cold_start(&self) -> &WeightSet {
        &self.cold_start
    }

    pub fn for_regime(&self, regime: WeightRegime) -> &WeightSet {
        match regime {
            WeightRegime::Standard => &self.standard,
            WeightRegime::ColdStart => &self.cold_start,
        }
    }
}

impl Default for WeightConfiguration {
    fn default() -> Self {
        Self {
            version: Self::BUILTIN_VERSION.to_string(),
            standard: WeightSet::standard(),
            cold_start: WeightSet::cold_start(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_match_published_tables() {
        let config = WeightConfiguration::default();
        assert_eq!(config.standard().intent, 0.35);
        assert_eq!(config.standard().consistency, 0.10);
        assert_eq!(config.cold_start().intent, 0.60);
        assert_eq!(config.cold_start().style, 0.0);
        assert_eq!(config.standard().behavior_level, 0.0);
    }

    #[test]
    fn factor_names_parse_case_insensitively() {
        assert_eq!("style".parse::<MatchingFactor>().unwrap(), MatchingFactor::Style);
        assert_eq!(
            " Behavior_Level ".parse::<MatchingFactor>().unwrap(),
            MatchingFactor::BehaviorLevel
        );
        assert!("TONE".parse::<MatchingFactor>().is_err());
    }

    #[test]
    fn overlay_replaces_known_and_reports_unknown() {
        let (set, unknown) = WeightSet::standard()
            .overlay(vec![("INTENT", 0.5), ("TONE", 0.2)])
            .unwrap();
        assert_eq!(set.intent, 0.5);
        assert_eq!(set.interest, 0.25);
        assert_eq!(unknown, vec!["TONE".to_string()]);
    }

    #[test]
    fn negative_weight_is_rejected() {
        assert!(WeightSet::standard().with(MatchingFactor::Style, -0.1).is_err());
        let bad = WeightSet {
            complexity: f64::INFINITY,
            ..WeightSet::standard()
        };
        assert!(WeightConfiguration::new("v2", bad, WeightSet::cold_start()).is_err());
    }

    #[test]
    fn regime_selects_weight_set() {
        let config = WeightConfiguration::default();
        assert_eq!(config.for_regime(WeightRegime::ColdStart).interest, 0.40);
        assert_eq!(config.for_regime(WeightRegime::Standard).interest, 0.25);
    }
}
