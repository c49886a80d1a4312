//! Back office configuration.
//!
//! ## Sources (Priority Order)
//! 1. Environment variables (`SALON_DATABASE_PATH`, `SALON_MAX_CONNECTIONS`,
//!    `SALON_LOG_LEVEL`)
//! 2. Config file (`backoffice.toml`, optional)
//! 3. Defaults (this file)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use salon_db::DbConfig;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "backoffice.toml";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Back office configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackofficeConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Pool size. Must be at least 1.
    pub max_connections: u32,

    /// Default log level when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for BackofficeConfig {
    fn default() -> Self {
        BackofficeConfig {
            database_path: default_database_path(),
            max_connections: 5,
            log_level: "info".to_string(),
        }
    }
}

impl BackofficeConfig {
    /// Loads `backoffice.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Loads the given config file (if present) and the environment.
    pub fn load_from(file: &Path) -> Result<Self, ConfigError> {
        let defaults = BackofficeConfig::default();

        let settings = Config::builder()
            .set_default(
                "database_path",
                defaults.database_path.to_string_lossy().to_string(),
            )?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .set_default("log_level", defaults.log_level)?
            .add_source(File::from(file).required(false))
            .add_source(Environment::with_prefix("SALON").try_parsing(true))
            .build()?;

        let config: BackofficeConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_connections".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "database_path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "log_level".to_string(),
                reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }
}

/// `<data dir>/salon.db`, or `./salon.db` when the platform has no data dir.
pub fn default_database_path() -> PathBuf {
    ProjectDirs::from("com", "salon", "backoffice")
        .map(|dirs| dirs.data_dir().join("salon.db"))
        .unwrap_or_else(|| PathBuf::from("./salon.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}
