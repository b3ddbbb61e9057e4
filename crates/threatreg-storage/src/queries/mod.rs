//! Query modules for each registry table.
//!
//! Every function takes a `&Connection`, so the same code runs on the writer,
//! a pooled reader, or inside an open transaction.

pub mod assignment_links;
pub mod assignments;
pub mod attributes;
pub mod components;
pub mod controls;
pub mod delegations;
pub mod domains;
pub mod patterns;
pub mod relationships;
pub mod resolutions;
pub mod tags;
pub mod threats;

use threatreg_core::errors::StorageError;

use crate::sqlite_err;

/// Drain a `query_map` iterator into a Vec.
pub(crate) fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Vec<T>, StorageError> {
    rows.map(|r| r.map_err(sqlite_err)).collect()
}

/// First row of a `query_map` iterator, if any.
pub(crate) fn first_row<T>(
    mut rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Option<T>, StorageError> {
    match rows.next() {
        Some(Ok(row)) => Ok(Some(row)),
        Some(Err(e)) => Err(sqlite_err(e)),
        None => Ok(None),
    }
}

/// SQLite counts are never negative.
pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}
