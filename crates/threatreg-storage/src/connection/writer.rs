//! Write connection utilities: BEGIN IMMEDIATE transactions.

use rusqlite::Connection;
use threatreg_core::errors::StorageError;

use crate::to_storage_err;

/// Execute a write operation inside a BEGIN IMMEDIATE transaction.
/// This acquires the write lock at transaction start, preventing SQLITE_BUSY
/// upgrades halfway through a multi-statement write.
///
/// The closure sees the plain connection; every statement it runs belongs to
/// the transaction. An `Err` from the closure rolls everything back.
pub fn with_immediate_transaction<F, T, E>(conn: &Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<StorageError>,
{
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| to_storage_err(format!("failed to begin immediate transaction: {e}")))?;

    match f(conn) {
        Ok(value) => {
            if let Err(e) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(to_storage_err(format!("failed to commit: {e}")).into());
            }
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                tracing::error!(error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}
