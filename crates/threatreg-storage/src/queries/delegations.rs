//! delegations queries.

use rusqlite::{params, Connection, Row};
use threatreg_core::errors::StorageError;
use threatreg_core::models::Delegation;
use threatreg_core::types::ResolutionId;

use super::{collect_rows, first_row};
use crate::sqlite_err;

fn row_to_delegation(row: &Row) -> rusqlite::Result<Delegation> {
    Ok(Delegation {
        id: row.get(0)?,
        delegated_by: row.get(1)?,
        delegated_to: row.get(2)?,
    })
}

pub fn insert_delegation(conn: &Connection, d: &Delegation) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO delegations (id, delegated_by, delegated_to) VALUES (?1, ?2, ?3)",
        params![d.id, d.delegated_by, d.delegated_to],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// The outgoing delegation of a resolution.
pub fn get_delegation_by_delegator(
    conn: &Connection,
    delegated_by: ResolutionId,
) -> Result<Option<Delegation>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, delegated_by, delegated_to FROM delegations WHERE delegated_by = ?1",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![delegated_by], row_to_delegation)
        .map_err(sqlite_err)?;
    first_row(rows)
}

/// Delegations filtered by either side. `None` on both sides lists nothing.
pub fn list_delegations(
    conn: &Connection,
    delegated_by: Option<ResolutionId>,
    delegated_to: Option<ResolutionId>,
) -> Result<Vec<Delegation>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, delegated_by, delegated_to FROM delegations
              WHERE (?1 IS NOT NULL OR ?2 IS NOT NULL)
                AND (?1 IS NULL OR delegated_by = ?1)
                AND (?2 IS NULL OR delegated_to = ?2)
              ORDER BY rowid",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![delegated_by, delegated_to], row_to_delegation)
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn delete_delegation_by_delegator(
    conn: &Connection,
    delegated_by: ResolutionId,
) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM delegations WHERE delegated_by = ?1",
        params![delegated_by],
    )
    .map_err(sqlite_err)
}

/// Remove every delegation in which the resolution takes part.
pub fn delete_delegations_involving(
    conn: &Connection,
    resolution_id: ResolutionId,
) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM delegations WHERE delegated_by = ?1 OR delegated_to = ?1",
        params![resolution_id],
    )
    .map_err(sqlite_err)
}
