//! In-memory assignment publisher that records events.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::domain::assignment::ProfileAssigned;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::AssignmentPublisher;

/// Captures published events for assertions.
///
/// # Panics
///
/// Methods panic if the internal lock is poisoned.
pub struct InMemoryAssignmentPublisher {
    published: RwLock<Vec<ProfileAssigned>>,
    failing: AtomicBool,
}

impl InMemoryAssignmentPublisher {
    pub fn new() -> Self {
        Self {
            published: RwLock::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    // === Test Helpers ===

    /// Makes subsequent publishes fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<ProfileAssigned> {
        self.published
            .read()
            .expect("InMemoryAssignmentPublisher: lock poisoned")
            .clone()
    }

    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .expect("InMemoryAssignmentPublisher: lock poisoned")
            .len()
    }
}

impl Default for InMemoryAssignmentPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssignmentPublisher for InMemoryAssignmentPublisher {
    async fn publish(&self, event: &ProfileAssigned) -> Result<String, DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(ErrorCode::StreamError, "publisher unavailable"));
        }
        let mut published = self
            .published
            .write()
            .expect("InMemoryAssignmentPublisher: lock poisoned");
        published.push(event.clone());
        Ok(format!("{}-0", published.len()))
    }
}
