//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `PROFILE_ASSIGNMENT`
//! prefix and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use profile_assignment::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```
//!
//! `database` and `redis` are optional. Without `database` the service runs
//! on in-memory stores; without `redis` the drift consumer does not start and
//! assignment events are kept in memory.

mod assignment;
mod behavior_service;
mod database;
mod error;
mod redis;
mod server;
mod streams;

pub use assignment::AssignmentConfig;
pub use behavior_service::BehaviorServiceConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use streams::StreamsConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL; `None` selects in-memory stores
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Redis; `None` disables the stream adapters
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    #[serde(default)]
    pub streams: StreamsConfig,

    #[serde(default)]
    pub behavior_service: BehaviorServiceConfig,

    #[serde(default)]
    pub assignment: AssignmentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present
    /// 2. Reads variables with the `PROFILE_ASSIGNMENT` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// - `PROFILE_ASSIGNMENT__SERVER__PORT=8000` -> `server.port = 8000`
    /// - `PROFILE_ASSIGNMENT__STREAMS__BATCH_SIZE=20` -> `streams.batch_size = 20`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PROFILE_ASSIGNMENT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        self.streams.validate()?;
        self.behavior_service.validate()?;
        self.assignment.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    /// Whether the drift consumer should run.
    pub fn consumer_enabled(&self) -> bool {
        self.streams.enabled && self.redis.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "PROFILE_ASSIGNMENT__DATABASE__URL",
        "PROFILE_ASSIGNMENT__REDIS__URL",
        "PROFILE_ASSIGNMENT__SERVER__PORT",
        "PROFILE_ASSIGNMENT__SERVER__ENVIRONMENT",
        "PROFILE_ASSIGNMENT__STREAMS__BATCH_SIZE",
        "PROFILE_ASSIGNMENT__STREAMS__ENABLED",
        "PROFILE_ASSIGNMENT__ASSIGNMENT__FALLBACK_THRESHOLD",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn loads_with_no_variables() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        let config = AppConfig::load().unwrap();

        assert!(config.database.is_none());
        assert!(config.redis.is_none());
        assert!(!config.consumer_enabled());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.streams.drift_stream, "drift.events");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_nested_sections() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("PROFILE_ASSIGNMENT__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("PROFILE_ASSIGNMENT__REDIS__URL", "redis://localhost:6379");
        env::set_var("PROFILE_ASSIGNMENT__SERVER__PORT", "3000");
        env::set_var("PROFILE_ASSIGNMENT__STREAMS__BATCH_SIZE", "25");
        env::set_var("PROFILE_ASSIGNMENT__ASSIGNMENT__FALLBACK_THRESHOLD", "0.8");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.database.as_ref().map(|d| d.url.as_str()),
            Some("postgresql://test@localhost/test")
        );
        assert!(config.consumer_enabled());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.streams.batch_size, 25);
        assert_eq!(config.assignment.policy().fallback_threshold, 0.8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn consumer_can_be_disabled() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("PROFILE_ASSIGNMENT__REDIS__URL", "redis://localhost:6379");
        env::set_var("PROFILE_ASSIGNMENT__STREAMS__ENABLED", "false");
        let result = AppConfig::load();
        clear_env();

        assert!(!result.unwrap().consumer_enabled());
    }

    #[test]
    fn production_flag() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("PROFILE_ASSIGNMENT__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }
}
