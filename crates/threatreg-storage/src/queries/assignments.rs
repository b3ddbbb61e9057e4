//! threat_assignments queries.

use rusqlite::{params, Connection, Row};
use threatreg_core::errors::StorageError;
use threatreg_core::models::{ThreatAssignment, ThreatAssignmentWithResolution};
use threatreg_core::types::{AssignmentId, ComponentId, ThreatId, ThreatSeverity};

use super::{collect_rows, first_row};
use crate::sqlite_err;

const COLUMNS: &str = "id, threat_id, component_id, severity, residual_severity";

pub(crate) fn row_to_assignment(row: &Row) -> rusqlite::Result<ThreatAssignment> {
    Ok(ThreatAssignment {
        id: row.get(0)?,
        threat_id: row.get(1)?,
        component_id: row.get(2)?,
        severity: row.get(3)?,
        residual_severity: row.get(4)?,
    })
}

pub fn insert_assignment(conn: &Connection, a: &ThreatAssignment) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO threat_assignments (id, threat_id, component_id, severity, residual_severity)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![a.id, a.threat_id, a.component_id, a.severity, a.residual_severity],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_assignment(
    conn: &Connection,
    id: AssignmentId,
) -> Result<Option<ThreatAssignment>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {COLUMNS} FROM threat_assignments WHERE id = ?1"))
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![id], row_to_assignment).map_err(sqlite_err)?;
    first_row(rows)
}

pub fn get_assignment_by_threat_and_component(
    conn: &Connection,
    threat_id: ThreatId,
    component_id: ComponentId,
) -> Result<Option<ThreatAssignment>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM threat_assignments WHERE threat_id = ?1 AND component_id = ?2"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![threat_id, component_id], row_to_assignment)
        .map_err(sqlite_err)?;
    first_row(rows)
}

pub fn update_severities(
    conn: &Connection,
    id: AssignmentId,
    severity: Option<ThreatSeverity>,
    residual_severity: Option<ThreatSeverity>,
) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE threat_assignments SET severity = ?2, residual_severity = ?3 WHERE id = ?1",
        params![id, severity, residual_severity],
    )
    .map_err(sqlite_err)
}

pub fn delete_assignment(conn: &Connection, id: AssignmentId) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM threat_assignments WHERE id = ?1", params![id])
        .map_err(sqlite_err)
}

pub fn list_assignments_by_component(
    conn: &Connection,
    component_id: ComponentId,
) -> Result<Vec<ThreatAssignment>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM threat_assignments WHERE component_id = ?1 ORDER BY rowid"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![component_id], row_to_assignment)
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn list_assignments_by_threat(
    conn: &Connection,
    threat_id: ThreatId,
) -> Result<Vec<ThreatAssignment>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM threat_assignments WHERE threat_id = ?1 ORDER BY rowid"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![threat_id], row_to_assignment).map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Assignments of `component_id` joined with the resolution that
/// `resolution_component_id` filed against each of them.
pub fn list_assignments_with_resolution(
    conn: &Connection,
    component_id: ComponentId,
    resolution_component_id: ComponentId,
) -> Result<Vec<ThreatAssignmentWithResolution>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT ta.id, ta.threat_id, ta.component_id, ta.severity, ta.residual_severity,
                    r.status,
                    EXISTS(SELECT 1 FROM delegations d WHERE d.delegated_by = r.id)
               FROM threat_assignments ta
               LEFT JOIN resolutions r
                 ON r.threat_assignment_id = ta.id AND r.component_id = ?2
              WHERE ta.component_id = ?1
              ORDER BY ta.rowid",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![component_id, resolution_component_id], |row| {
            Ok(ThreatAssignmentWithResolution {
                assignment: row_to_assignment(row)?,
                resolution_status: row.get(5)?,
                is_delegated: row.get(6)?,
            })
        })
        .map_err(sqlite_err)?;
    collect_rows(rows)
}
