// lib/src/storage_engine/config.rs

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use models::errors::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngineType {
    #[default]
    #[serde(alias = "in_memory", alias = "memory")]
    InMemory,
}

impl fmt::Display for StorageEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageEngineType::InMemory => write!(f, "inmemory"),
        }
    }
}

pub fn default_storage_engine_type() -> StorageEngineType {
    StorageEngineType::InMemory
}

/// Storage settings, usually read from a TOML file:
///
/// ```toml
/// engine_type = "inmemory"
/// data_path = "/var/lib/graph/vertices.msgpack"
/// ```
///
/// Without a `data_path` the in-memory engine keeps nothing across restarts.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default = "default_storage_engine_type")]
    pub engine_type: StorageEngineType,
    #[serde(default)]
    pub data_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            engine_type: default_storage_engine_type(),
            data_path: None,
        }
    }
}

impl StorageConfig {
    pub fn in_memory(data_path: Option<PathBuf>) -> Self {
        StorageConfig {
            engine_type: StorageEngineType::InMemory,
            data_path,
        }
    }

    pub fn from_toml_str(content: &str) -> GraphResult<Self> {
        toml::from_str(content)
            .map_err(|e| GraphError::ConfigError(format!("Failed to parse storage config: {}", e)))
    }

    pub fn load(path: &Path) -> GraphResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GraphError::ConfigError(format!("Failed to read storage config {:?}: {}", path, e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded storage configuration from {:?} (engine: {})", path, config.engine_type);
        Ok(config)
    }
}
