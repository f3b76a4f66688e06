use checklist_core::sanitizer::DEFAULT_NOTES_MAX_LENGTH;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub checklist: ChecklistConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub init_schema: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChecklistConfig {
    /// TOML catalog to load instead of the built-in one
    pub catalog_path: Option<String>,
    pub notes_max_length: usize,
}

impl Config {
    fn default_builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8090)?
            .set_default("server.workers", 4)?
            .set_default("database.url", "postgresql://localhost:5432/regucheck_db")?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 5)?
            .set_default("database.init_schema", true)?
            .set_default("storage.backend", "postgres")?
            .set_default("checklist.notes_max_length", DEFAULT_NOTES_MAX_LENGTH as i64)
    }

    /// Built-in defaults only, no file or environment sources.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::default_builder()?.build()?.try_deserialize()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let mut builder = Self::default_builder()?;

        if let Ok(config_file) = env::var("CONFIG_FILE") {
            builder = builder.add_source(File::with_name(&config_file).required(false));
        } else {
            builder = builder.add_source(
                File::with_name(&format!("config/{}", environment)).required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("CHECKLIST_ENGINE")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(db_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", db_url)?;
        }

        if let Ok(port) = env::var("CHECKLIST_ENGINE_PORT") {
            builder = builder.set_override("server.port", port)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port cannot be 0".to_string());
        }

        if self.server.workers == 0 {
            return Err("At least one server worker is required".to_string());
        }

        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_empty() {
            return Err("Database URL is required for the postgres backend".to_string());
        }

        if self.checklist.notes_max_length == 0 {
            return Err("Notes max length must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::defaults().unwrap();
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.checklist.notes_max_length, DEFAULT_NOTES_MAX_LENGTH);
        assert!(config.checklist.catalog_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::defaults().unwrap();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::defaults().unwrap();
        config.database.url.clear();
        assert!(config.validate().is_err());

        // Memory backend does not need a database
        config.storage.backend = StorageBackend::Memory;
        assert!(config.validate().is_ok());

        config.checklist.notes_max_length = 0;
        assert!(config.validate().is_err());
    }
}
