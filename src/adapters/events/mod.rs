//! Event-driven background services.
//!
//! - `DriftConsumer` - Drains the inbound drift stream into the drift handler

mod drift_consumer;

pub use drift_consumer::{BatchReport, DriftConsumer, DriftConsumerConfig};
