//! Application configuration.
//!
//! Loaded from a YAML file and environment variables; environment wins.

use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "BASKET_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "BASKET";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "BASKET_LOG";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Diagnostics secret probe configuration.
    pub secret: SecretConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Sources, later overrides earlier:
    /// 1. `config.yaml` in the current directory (if present)
    /// 2. File given by the `path` argument (if provided)
    /// 3. File named by `BASKET_CONFIG` (if set)
    /// 4. `BASKET`-prefixed environment variables (`__` separator,
    ///    e.g. `BASKET__STORAGE__TABLE`)
    pub fn load(path: Option<&str>) -> Result<Self, ::config::ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Baskets table name.
    pub table: String,
    /// Local secondary index on `userId`/`lastUpdated`.
    pub index: String,
    /// AWS region override (SDK default if not specified).
    pub region: Option<String>,
    /// Endpoint override, e.g. a local DynamoDB at
    /// `http://localhost:8000` for offline development.
    pub endpoint: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            table: "baskets".to_string(),
            index: "userId-lastUpdated-index".to_string(),
            region: None,
            endpoint: None,
        }
    }
}

/// Diagnostics secret probe configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecretConfig {
    /// Secrets Manager secret name to probe; probing is off when unset.
    pub name: Option<String>,
}
