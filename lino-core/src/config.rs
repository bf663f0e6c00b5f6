//! Configuration for the client

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory for the local RocksDB mirror
    pub data_dir: PathBuf,

    /// Service name
    pub service_name: String,

    /// RocksDB configuration
    pub rocksdb: RocksDBConfig,

    /// History query configuration
    pub history: HistoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/lino"),
            service_name: "lino-core".to_string(),
            rocksdb: RocksDBConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

/// RocksDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RocksDBConfig {
    /// Write buffer size (MB)
    pub write_buffer_size_mb: usize,

    /// Max background jobs (compaction + flush)
    pub max_background_jobs: i32,

    /// Enable statistics
    pub enable_statistics: bool,
}

impl Default for RocksDBConfig {
    fn default() -> Self {
        Self {
            write_buffer_size_mb: 64,
            max_background_jobs: 2,
            enable_statistics: false,
        }
    }
}

/// History query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Largest count accepted by `get_recent`
    pub max_recent: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_recent: i32::MAX as i64,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("LINO_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(max_recent) = std::env::var("LINO_MAX_RECENT") {
            config.history.max_recent = max_recent.parse().map_err(|_| {
                crate::Error::Config(format!("LINO_MAX_RECENT is not an integer: {}", max_recent))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.history.max_recent <= 0 {
            return Err(crate::Error::Config(format!(
                "history.max_recent must be positive, got {}",
                self.history.max_recent
            )));
        }
        Ok(())
    }
}
