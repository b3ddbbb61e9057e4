//! Schema migrations using PRAGMA user_version.

pub mod v001_catalogue;
pub mod v002_assignments;
pub mod v003_patterns;

use rusqlite::Connection;
use threatreg_core::errors::StorageError;

/// Latest schema version known to this build.
pub const LATEST_VERSION: u32 = 3;

/// Run all pending migrations. Each version runs in its own transaction.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current_version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StorageError::MigrationFailed {
            version: 0,
            message: e.to_string(),
        })?;

    let migrations: &[(&str, u32)] = &[
        (v001_catalogue::MIGRATION_SQL, 1),
        (v002_assignments::MIGRATION_SQL, 2),
        (v003_patterns::MIGRATION_SQL, 3),
    ];

    for (sql, version) in migrations {
        if current_version >= *version {
            continue;
        }
        let failed = |e: rusqlite::Error| StorageError::MigrationFailed {
            version: *version,
            message: e.to_string(),
        };

        let tx = conn.unchecked_transaction().map_err(failed)?;
        tx.execute_batch(sql).map_err(failed)?;
        tx.pragma_update(None, "user_version", version).map_err(failed)?;
        tx.commit().map_err(failed)?;
        tracing::info!(version = version, "applied migration");
    }

    Ok(())
}

/// Get the current schema version.
pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(crate::sqlite_err)
}
