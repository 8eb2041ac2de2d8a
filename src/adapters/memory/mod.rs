//! In-memory adapters.
//!
//! Used by tests and by local runs. `InMemoryProfileCatalog` can also back
//! a real deployment when the catalog is seeded from a YAML file.

mod account_store;
mod behavior_source;
mod catalog;
mod drift_event_log;
mod publisher;
mod ranking_state_repository;

pub use account_store::InMemoryAccountStore;
pub use behavior_source::InMemoryBehaviorSource;
pub use catalog::InMemoryProfileCatalog;
pub use drift_event_log::InMemoryDriftEventLog;
pub use publisher::InMemoryAssignmentPublisher;
pub use ranking_state_repository::InMemoryRankingStateRepository;
