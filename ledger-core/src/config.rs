//! Configuration for the ledger core

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for the receipt store
    pub data_dir: PathBuf,

    /// Trading pairs to mirror in the order-book index.
    ///
    /// Each entry is `<in>/<out>` where either side is `native` or a 64-char
    /// hex asset id. A single `"*"` tracks every pair lazily.
    pub tracked_pairs: Vec<String>,

    /// RocksDB tuning for the receipt store
    pub rocksdb: RocksDbConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/energyledger"),
            tracked_pairs: vec!["*".to_string()],
            rocksdb: RocksDbConfig::default(),
        }
    }
}

/// RocksDB tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocksDbConfig {
    /// Write buffer size (MB)
    pub write_buffer_size_mb: usize,

    /// Max write buffers
    pub max_write_buffer_number: i32,

    /// Max background jobs (compaction + flush)
    pub max_background_jobs: i32,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            write_buffer_size_mb: 64,
            max_write_buffer_number: 4,
            max_background_jobs: 2,
        }
    }
}

impl Config {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load defaults, then apply environment overrides
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("ENERGY_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(pairs) = std::env::var("ENERGY_TRACKED_PAIRS") {
            config.tracked_pairs = pairs.split(',').map(|s| s.trim().to_string()).collect();
        }

        Ok(config)
    }
}
