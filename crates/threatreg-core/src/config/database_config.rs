//! Database configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_DATABASE_PATH, DEFAULT_READ_POOL_SIZE};

/// Where the registry keeps its SQLite file and how connections are opened.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file path. Default: `app.db`.
    pub path: Option<String>,
    /// Number of read-only connections. Default: 4.
    pub read_pool_size: Option<usize>,
    /// SQLite busy timeout in milliseconds. Default: 5000.
    pub busy_timeout_ms: Option<u32>,
}

impl DatabaseConfig {
    pub fn effective_path(&self) -> &str {
        self.path.as_deref().unwrap_or(DEFAULT_DATABASE_PATH)
    }

    pub fn effective_read_pool_size(&self) -> usize {
        self.read_pool_size.unwrap_or(DEFAULT_READ_POOL_SIZE)
    }

    pub fn effective_busy_timeout_ms(&self) -> u32 {
        self.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS)
    }
}
