//! Upstream behavior service adapters.

mod http_behavior_source;

pub use http_behavior_source::HttpBehaviorSource;
