//! Configuration management for the Saw-it backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SAWIT_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::LahanAttributes;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT verification configuration
    pub jwt: JwtConfig,

    /// Yield predictor service configuration
    pub predictor: PredictorConfig,

    /// Categorical attributes given to a new lahan when the caller omits them
    pub lahan_defaults: LahanAttributes,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret the auth service signs access tokens with
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PredictorConfig {
    /// Full URL of the `/predict` endpoint
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SAWIT_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let defaults = LahanAttributes::default();

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5001)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("predictor.endpoint", "http://localhost:8000/predict")?
            .set_default("predictor.timeout_secs", 5)?
            .set_default("lahan_defaults.penanggung_jawab", defaults.penanggung_jawab)?
            .set_default("lahan_defaults.jenis_tanah", defaults.jenis_tanah)?
            .set_default("lahan_defaults.sistem_irigasi", defaults.sistem_irigasi)?
            .set_default("lahan_defaults.lahan_kabupaten", defaults.lahan_kabupaten)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SAWIT_ prefix)
            .add_source(
                Environment::with_prefix("SAWIT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/predict".to_string(),
            timeout_secs: 5,
        }
    }
}
