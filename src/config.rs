use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::db::services::quota_service::QuotaLimits;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("{0} is required")]
    Missing(&'static str),
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_column_limit")]
    pub column_limit: u64,

    #[serde(default = "default_column_limit_bypass")]
    pub column_limit_bypass: u64,

    #[serde(default = "default_item_limit")]
    pub item_limit: u64,

    #[serde(default = "default_item_limit_bypass")]
    pub item_limit_bypass: u64,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialAppConfig {
    database_url: Option<String>,
    max_connections: Option<u32>,
    log_dir: Option<String>,
    column_limit: Option<u64>,
    column_limit_bypass: Option<u64>,
    item_limit: Option<u64>,
    item_limit_bypass: Option<u64>,
}

fn default_max_connections() -> u32 {
    10
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_column_limit() -> u64 {
    50
}

fn default_column_limit_bypass() -> u64 {
    500
}

fn default_item_limit() -> u64 {
    5_000
}

fn default_item_limit_bypass() -> u64 {
    50_000
}

impl AppConfig {
    /// Loads `.env`, then the optional TOML file, then environment variables.
    /// Environment values override the file.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let file_config = match config_path {
            Some(path_str) => Self::read_file(Path::new(path_str))?,
            None => PartialAppConfig::default(),
        };
        let env_config: PartialAppConfig = envy::from_env()?;

        Self::merge(env_config, file_config)
    }

    fn read_file(path: &Path) -> Result<PartialAppConfig, ConfigError> {
        if !path.exists() {
            return Ok(PartialAppConfig::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn merge(env: PartialAppConfig, file: PartialAppConfig) -> Result<Self, ConfigError> {
        Ok(AppConfig {
            database_url: env
                .database_url
                .or(file.database_url)
                .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            max_connections: env
                .max_connections
                .or(file.max_connections)
                .unwrap_or_else(default_max_connections),
            log_dir: env.log_dir.or(file.log_dir).unwrap_or_else(default_log_dir),
            column_limit: env
                .column_limit
                .or(file.column_limit)
                .unwrap_or_else(default_column_limit),
            column_limit_bypass: env
                .column_limit_bypass
                .or(file.column_limit_bypass)
                .unwrap_or_else(default_column_limit_bypass),
            item_limit: env
                .item_limit
                .or(file.item_limit)
                .unwrap_or_else(default_item_limit),
            item_limit_bypass: env
                .item_limit_bypass
                .or(file.item_limit_bypass)
                .unwrap_or_else(default_item_limit_bypass),
        })
    }

    pub fn quota_limits(&self) -> QuotaLimits {
        QuotaLimits {
            column_limit: self.column_limit,
            column_limit_bypass: self.column_limit_bypass,
            item_limit: self.item_limit,
            item_limit_bypass: self.item_limit_bypass,
        }
    }
}
