//! AssignmentPublisher port - announces committed assignments downstream.

use async_trait::async_trait;

use crate::domain::assignment::ProfileAssigned;
use crate::domain::foundation::DomainError;

/// Port for publishing `profile.assigned` notifications.
///
/// Callers treat failures as non-fatal: the assignment is already persisted.
#[async_trait]
pub trait AssignmentPublisher: Send + Sync {
    /// Publish one event. Returns the transport's message id.
    async fn publish(&self, event: &ProfileAssigned) -> Result<String, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn AssignmentPublisher) {}
}
