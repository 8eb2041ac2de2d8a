//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Reference Data
//!
//! - `ProfileCatalog` - Profile definitions and weight tables
//!
//! ## State
//!
//! - `RankingStateRepository` - Per-(user, profile) running statistics
//! - `AccountStore` - Mode and committed profile on the external account
//!
//! ## Integration
//!
//! - `RecentBehaviorSource` - Upstream recent-behavior fetch
//! - `DriftEventLog` - Inbound drift stream (consumer group)
//! - `AssignmentPublisher` - Outbound assignment stream

mod account_store;
mod assignment_publisher;
mod behavior_source;
mod drift_event_log;
mod profile_catalog;
mod ranking_state_repository;

pub use account_store::{AccountRecord, AccountStore};
pub use assignment_publisher::AssignmentPublisher;
pub use behavior_source::{BehaviorSourceError, RecentBehaviorSource};
pub use drift_event_log::{DriftEventLog, ReadCursor, StreamEntry};
pub use profile_catalog::ProfileCatalog;
pub use ranking_state_repository::RankingStateRepository;
