//! Storage-layer errors for SQLite operations.

use super::error_code::{self, RegistryErrorCode};

/// Errors raised by the storage crate.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("database is busy")]
    DbBusy,

    #[error("corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },
}

impl RegistryErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SqliteError { .. } => error_code::STORAGE_ERROR,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::DbBusy => error_code::DB_BUSY,
            Self::CorruptRow { .. } => error_code::CORRUPT_ROW,
        }
    }
}
