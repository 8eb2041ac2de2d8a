//! ProfileCatalog port - read-only access to profile reference data.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::matching::{ProfileDefinition, WeightConfiguration};

/// Port for loading the predefined profile catalog and weight tables.
///
/// Both are reference data owned outside this service. Implementations
/// return profiles in stable catalog order, which is the ranking tie-break.
#[async_trait]
pub trait ProfileCatalog: Send + Sync {
    /// Load every profile with its intent, interest, behavior-level, and
    /// style-signal associations.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on storage failure
    async fn load_profiles(&self) -> Result<Vec<ProfileDefinition>, DomainError>;

    /// Load the current weight configuration.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError` if stored weights are negative or non-finite
    /// - `DatabaseError` on storage failure
    async fn load_weights(&self) -> Result<WeightConfiguration, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn ProfileCatalog) {}
}
