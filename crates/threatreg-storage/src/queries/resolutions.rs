//! resolutions queries.

use rusqlite::{params, Connection, Row};
use threatreg_core::errors::StorageError;
use threatreg_core::models::Resolution;
use threatreg_core::types::{AssignmentId, ComponentId, ResolutionId, ResolutionStatus};

use super::{collect_rows, first_row};
use crate::sqlite_err;

const COLUMNS: &str = "id, threat_assignment_id, component_id, status, description";

pub(crate) fn row_to_resolution(row: &Row) -> rusqlite::Result<Resolution> {
    Ok(Resolution {
        id: row.get(0)?,
        threat_assignment_id: row.get(1)?,
        component_id: row.get(2)?,
        status: row.get(3)?,
        description: row.get(4)?,
    })
}

fn query_list(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Resolution>, StorageError> {
    let mut stmt = conn.prepare_cached(sql).map_err(sqlite_err)?;
    let rows = stmt.query_map(params, row_to_resolution).map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn insert_resolution(conn: &Connection, r: &Resolution) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO resolutions (id, threat_assignment_id, component_id, status, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![r.id, r.threat_assignment_id, r.component_id, r.status, r.description],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_resolution(
    conn: &Connection,
    id: ResolutionId,
) -> Result<Option<Resolution>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {COLUMNS} FROM resolutions WHERE id = ?1"))
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![id], row_to_resolution).map_err(sqlite_err)?;
    first_row(rows)
}

pub fn get_resolution_by_assignment_and_component(
    conn: &Connection,
    threat_assignment_id: AssignmentId,
    component_id: ComponentId,
) -> Result<Option<Resolution>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM resolutions
             WHERE threat_assignment_id = ?1 AND component_id = ?2"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![threat_assignment_id, component_id], row_to_resolution)
        .map_err(sqlite_err)?;
    first_row(rows)
}

pub fn list_resolutions_by_component(
    conn: &Connection,
    component_id: ComponentId,
) -> Result<Vec<Resolution>, StorageError> {
    query_list(
        conn,
        &format!("SELECT {COLUMNS} FROM resolutions WHERE component_id = ?1 ORDER BY rowid"),
        params![component_id],
    )
}

pub fn list_resolutions_by_assignment(
    conn: &Connection,
    threat_assignment_id: AssignmentId,
) -> Result<Vec<Resolution>, StorageError> {
    query_list(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM resolutions WHERE threat_assignment_id = ?1 ORDER BY rowid"
        ),
        params![threat_assignment_id],
    )
}

/// Resolutions that delegate directly to `id`.
pub fn list_delegators(
    conn: &Connection,
    id: ResolutionId,
) -> Result<Vec<Resolution>, StorageError> {
    query_list(
        conn,
        "SELECT r.id, r.threat_assignment_id, r.component_id, r.status, r.description
           FROM resolutions r
           JOIN delegations d ON d.delegated_by = r.id
          WHERE d.delegated_to = ?1
          ORDER BY r.rowid",
        params![id],
    )
}

/// The resolution `id` delegates to, if any.
pub fn get_delegate(
    conn: &Connection,
    id: ResolutionId,
) -> Result<Option<Resolution>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT r.id, r.threat_assignment_id, r.component_id, r.status, r.description
               FROM resolutions r
               JOIN delegations d ON d.delegated_to = r.id
              WHERE d.delegated_by = ?1",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![id], row_to_resolution).map_err(sqlite_err)?;
    first_row(rows)
}

pub fn update_resolution(
    conn: &Connection,
    id: ResolutionId,
    status: ResolutionStatus,
    description: &str,
) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE resolutions SET status = ?2, description = ?3 WHERE id = ?1",
        params![id, status, description],
    )
    .map_err(sqlite_err)
}

pub fn set_status(
    conn: &Connection,
    id: ResolutionId,
    status: ResolutionStatus,
) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE resolutions SET status = ?2 WHERE id = ?1",
        params![id, status],
    )
    .map_err(sqlite_err)
}

pub fn delete_resolution(conn: &Connection, id: ResolutionId) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM resolutions WHERE id = ?1", params![id])
        .map_err(sqlite_err)
}
