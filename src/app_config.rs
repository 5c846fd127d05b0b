//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with BOARDMOD_, sections split by `__`)
//! 2. Config file (boardmod.toml)
//! 3. Default values
//!
//! The hashing secret and database credentials belong in environment
//! variables, not in the config file.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. `postgres://user@host/db` or `sqlite://path?mode=rwc`
    pub url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// Create missing tables on startup
    pub create_schema: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/boardmod".to_string(),
            max_connections: 10,
            create_schema: false,
        }
    }
}

/// Password hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Argon2 memory cost in KiB
    pub memory_kib: u32,
    /// Argon2 time cost (passes)
    pub iterations: u32,
    /// Argon2 lanes
    pub parallelism: u32,
    /// Server-side secret (pepper). Should be in env var BOARDMOD_HASHING__SECRET
    #[serde(default)]
    pub secret: String,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
            secret: String::new(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub hashing: HashingConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("boardmod.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // e.g., BOARDMOD_DATABASE__URL, BOARDMOD_HASHING__SECRET
            .add_source(
                Environment::with_prefix("BOARDMOD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
