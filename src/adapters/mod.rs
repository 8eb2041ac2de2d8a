//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - Ranking states, profile catalog, and account store
//! - `redis` - Drift stream consumer group and assignment stream publisher
//! - `behavior` - Upstream recent-behavior HTTP client
//! - `memory` - In-process implementations for tests and local runs
//! - `events` - Background drift consumer
//! - `http` - REST API

pub mod behavior;
pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod redis;

pub use events::{DriftConsumer, DriftConsumerConfig};
