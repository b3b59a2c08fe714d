use std::env;

use dotenvy::dotenv;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL must be set unless USE_MEMORY_STORE=true")]
    MissingDatabaseUrl,

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),
}

#[derive(Debug, Clone, Validate)]
pub struct Config {
    pub database_url: Option<String>,
    pub use_memory_store: bool,
    #[validate(range(min = 1, max = 100))]
    pub max_connections: u32,
    #[validate(range(min = 1))]
    pub port: u16,
    #[validate(length(min = 1))]
    pub audit_user: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            use_memory_store: false,
            max_connections: 5,
            port: 3000,
            audit_user: "anonymous".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load environment variables from `.env` file (if it exists)
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let use_memory_store = lookup("USE_MEMORY_STORE")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.use_memory_store);
        let database_url = lookup("DATABASE_URL").filter(|v| !v.is_empty());

        if database_url.is_none() && !use_memory_store {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        let config = Config {
            database_url,
            use_memory_store,
            max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connections),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            audit_user: lookup("AUDIT_USER").unwrap_or(defaults.audit_user),
        };

        // Validate configuration values (e.g. pool size range)
        config.validate()?;
        Ok(config)
    }
}
