use crate::domain::{ChipValueMode, ColorValues, Decimal, SessionConfig};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub snapshot_store: SnapshotStoreKind,
    /// Required for the SQLite store.
    pub database_path: Option<String>,
    /// Applied to sessions created without an explicit configuration.
    pub default_session: SessionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStoreKind {
    Sqlite,
    Memory,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let snapshot_store = match env_map
            .get("SNAPSHOT_STORE")
            .map(|s| s.as_str())
            .unwrap_or("sqlite")
        {
            "sqlite" => SnapshotStoreKind::Sqlite,
            "memory" => SnapshotStoreKind::Memory,
            other => {
                return Err(ConfigError::InvalidValue(
                    "SNAPSHOT_STORE".to_string(),
                    format!("must be sqlite or memory, got {}", other),
                ))
            }
        };

        let database_path = env_map.get("DATABASE_PATH").cloned();
        if snapshot_store == SnapshotStoreKind::Sqlite && database_path.is_none() {
            return Err(ConfigError::MissingEnv("DATABASE_PATH".to_string()));
        }

        let stack_unit_value = env_map
            .get("DEFAULT_STACK_VALUE")
            .map(|s| s.as_str())
            .unwrap_or("20")
            .parse::<Decimal>()
            .ok()
            .filter(|v| !v.is_negative())
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "DEFAULT_STACK_VALUE".to_string(),
                    "must be a non-negative decimal".to_string(),
                )
            })?;

        let chips_per_stack = env_map
            .get("DEFAULT_CHIPS_PER_STACK")
            .map(|s| s.as_str())
            .unwrap_or("20")
            .parse::<i64>()
            .ok()
            .filter(|v| *v >= 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "DEFAULT_CHIPS_PER_STACK".to_string(),
                    "must be a non-negative integer".to_string(),
                )
            })?;

        let chip_value_mode = match env_map
            .get("DEFAULT_CHIP_MODE")
            .map(|s| s.as_str())
            .unwrap_or("uniform")
        {
            "uniform" => ChipValueMode::Uniform,
            "per_color" => ChipValueMode::PerColor,
            other => {
                return Err(ConfigError::InvalidValue(
                    "DEFAULT_CHIP_MODE".to_string(),
                    format!("must be uniform or per_color, got {}", other),
                ))
            }
        };

        Ok(Config {
            port,
            snapshot_store,
            database_path,
            default_session: SessionConfig {
                chip_value_mode,
                stack_unit_value,
                chips_per_stack,
                color_values: ColorValues::default(),
            },
        })
    }
}
