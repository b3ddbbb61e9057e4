//! Connection management: write-serialized + read-pooled.

pub mod pool;
pub mod pragmas;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use threatreg_core::config::DatabaseConfig;
use threatreg_core::constants::{DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_READ_POOL_SIZE};
use threatreg_core::errors::StorageError;

use self::pool::ReadPool;
use self::pragmas::apply_pragmas;
use crate::{migrations, to_storage_err};

/// Tunables for opening a database.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub read_pool_size: usize,
    pub busy_timeout_ms: u32,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            read_pool_size: DEFAULT_READ_POOL_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl From<&DatabaseConfig> for ConnectionOptions {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            read_pool_size: config.effective_read_pool_size(),
            busy_timeout_ms: config.effective_busy_timeout_ms(),
        }
    }
}

/// Manages the single write connection and the read connection pool.
///
/// In-memory databases have no read pool: a second in-memory connection would
/// be a different database, so reads go through the writer.
pub struct DatabaseManager {
    writer: Mutex<Connection>,
    readers: Option<ReadPool>,
    path: Option<PathBuf>,
}

impl DatabaseManager {
    /// Open a database at the given path with default options.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::open_with_options(path, ConnectionOptions::default())
    }

    /// Open the database described by a `[database]` config section.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, StorageError> {
        Self::open_with_options(Path::new(config.effective_path()), config.into())
    }

    /// Open a database, apply pragmas, run migrations, then open the readers.
    pub fn open_with_options(path: &Path, options: ConnectionOptions) -> Result<Self, StorageError> {
        let writer = Connection::open(path)
            .map_err(|e| to_storage_err(format!("open {}: {e}", path.display())))?;
        apply_pragmas(&writer, options.busy_timeout_ms)?;
        migrations::run_migrations(&writer)?;

        let readers = ReadPool::open(path, options.read_pool_size, options.busy_timeout_ms)?;
        tracing::debug!(
            path = %path.display(),
            readers = readers.size(),
            "opened registry database"
        );

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Some(readers),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Connection::open_in_memory()
            .map_err(|e| to_storage_err(format!("open in-memory database: {e}")))?;
        apply_pragmas(&writer, DEFAULT_BUSY_TIMEOUT_MS)?;
        migrations::run_migrations(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: None,
            path: None,
        })
    }

    /// Execute a write operation with the serialized writer connection.
    pub fn with_writer<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<StorageError>,
    {
        let guard = self
            .writer
            .lock()
            .map_err(|_| to_storage_err("write lock poisoned"))?;
        f(&guard)
    }

    /// Execute a write operation inside a `BEGIN IMMEDIATE` transaction on the
    /// writer. Any error rolls the whole closure back.
    pub fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<StorageError>,
    {
        self.with_writer(|conn| writer::with_immediate_transaction(conn, f))
    }

    /// Execute a read operation with a pooled read connection.
    pub fn with_reader<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<StorageError>,
    {
        match &self.readers {
            Some(pool) => pool.with_conn(f),
            None => self.with_writer(f),
        }
    }

    /// Run a WAL checkpoint (TRUNCATE mode).
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(crate::sqlite_err)
        })
    }

    /// Get the database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of read connections (0 for in-memory).
    pub fn reader_count(&self) -> usize {
        self.readers.as_ref().map_or(0, ReadPool::size)
    }
}
