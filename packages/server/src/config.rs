use common::config::StorageConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allowed origins. An empty list allows any origin.
    #[serde(default)]
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://videos.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., VIDEOHOST__STORAGE__CHUNK_SIZE)
            .add_source(Environment::with_prefix("VIDEOHOST").separator("__"))
            // Conventional deployment variables win over everything else.
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?;

        let config: Self = s.try_deserialize()?;
        validate_storage(&config.storage)?;
        Ok(config)
    }
}

/// Chunk sizes must be positive and fit the `i32` chunk size column.
fn validate_storage(storage: &StorageConfig) -> Result<(), ConfigError> {
    if storage.chunk_size == 0 || i32::try_from(storage.chunk_size).is_err() {
        return Err(ConfigError::Message(format!(
            "storage.chunk_size must be between 1 and {}, got {}",
            i32::MAX,
            storage.chunk_size
        )));
    }
    Ok(())
}
