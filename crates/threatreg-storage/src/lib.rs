//! threatreg-storage: SQLite persistence for the threat registry.
//!
//! - `connection`: one serialized writer plus a round-robin read pool
//! - `migrations`: schema versions tracked with `PRAGMA user_version`
//! - `queries`: free functions per table, all taking `&Connection`

pub mod connection;
pub mod migrations;
pub mod queries;

pub use connection::{ConnectionOptions, DatabaseManager};

use threatreg_core::errors::StorageError;

/// Map a rusqlite error into the storage error enum.
pub(crate) fn sqlite_err(e: rusqlite::Error) -> StorageError {
    match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
            StorageError::DbBusy
        }
        _ => StorageError::SqliteError {
            message: e.to_string(),
        },
    }
}

/// Storage error with a context message.
pub(crate) fn to_storage_err(message: impl Into<String>) -> StorageError {
    StorageError::SqliteError {
        message: message.into(),
    }
}
