//! controls, threat_controls and control_assignments queries.

use rusqlite::{params, Connection, Row};
use threatreg_core::errors::StorageError;
use threatreg_core::models::{Control, ControlAssignment, ThreatControl};
use threatreg_core::types::{AssignmentId, ControlId, ThreatId};

use super::{collect_rows, first_row};
use crate::sqlite_err;

fn row_to_control(row: &Row) -> rusqlite::Result<Control> {
    Ok(Control {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
    })
}

// ---- controls ----

pub fn insert_control(conn: &Connection, control: &Control) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO controls (id, title, description) VALUES (?1, ?2, ?3)",
        params![control.id, control.title, control.description],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_control(conn: &Connection, id: ControlId) -> Result<Option<Control>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, title, description FROM controls WHERE id = ?1")
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![id], row_to_control).map_err(sqlite_err)?;
    first_row(rows)
}

pub fn update_control(conn: &Connection, control: &Control) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE controls SET title = ?2, description = ?3 WHERE id = ?1",
        params![control.id, control.title, control.description],
    )
    .map_err(sqlite_err)
}

pub fn delete_control(conn: &Connection, id: ControlId) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM controls WHERE id = ?1", params![id])
        .map_err(sqlite_err)
}

pub fn list_controls(conn: &Connection) -> Result<Vec<Control>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, title, description FROM controls ORDER BY title, id")
        .map_err(sqlite_err)?;
    let rows = stmt.query_map([], row_to_control).map_err(sqlite_err)?;
    collect_rows(rows)
}

// ---- threat_controls ----

pub fn insert_threat_control(conn: &Connection, link: &ThreatControl) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO threat_controls (id, threat_id, control_id) VALUES (?1, ?2, ?3)",
        params![link.id, link.threat_id, link.control_id],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_threat_control(
    conn: &Connection,
    threat_id: ThreatId,
    control_id: ControlId,
) -> Result<Option<ThreatControl>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, threat_id, control_id FROM threat_controls
             WHERE threat_id = ?1 AND control_id = ?2",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![threat_id, control_id], |row| {
            Ok(ThreatControl {
                id: row.get(0)?,
                threat_id: row.get(1)?,
                control_id: row.get(2)?,
            })
        })
        .map_err(sqlite_err)?;
    first_row(rows)
}

pub fn delete_threat_control(
    conn: &Connection,
    threat_id: ThreatId,
    control_id: ControlId,
) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM threat_controls WHERE threat_id = ?1 AND control_id = ?2",
        params![threat_id, control_id],
    )
    .map_err(sqlite_err)
}

pub fn list_controls_by_threat(
    conn: &Connection,
    threat_id: ThreatId,
) -> Result<Vec<Control>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT c.id, c.title, c.description
               FROM controls c
               JOIN threat_controls tc ON tc.control_id = c.id
              WHERE tc.threat_id = ?1
              ORDER BY c.title, c.id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![threat_id], row_to_control).map_err(sqlite_err)?;
    collect_rows(rows)
}

// ---- control_assignments ----

pub fn insert_control_assignment(
    conn: &Connection,
    assignment: &ControlAssignment,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO control_assignments (id, threat_assignment_id, control_id)
         VALUES (?1, ?2, ?3)",
        params![
            assignment.id,
            assignment.threat_assignment_id,
            assignment.control_id,
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_control_assignment(
    conn: &Connection,
    threat_assignment_id: AssignmentId,
    control_id: ControlId,
) -> Result<Option<ControlAssignment>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, threat_assignment_id, control_id FROM control_assignments
             WHERE threat_assignment_id = ?1 AND control_id = ?2",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![threat_assignment_id, control_id], |row| {
            Ok(ControlAssignment {
                id: row.get(0)?,
                threat_assignment_id: row.get(1)?,
                control_id: row.get(2)?,
            })
        })
        .map_err(sqlite_err)?;
    first_row(rows)
}

pub fn delete_control_assignment(
    conn: &Connection,
    threat_assignment_id: AssignmentId,
    control_id: ControlId,
) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM control_assignments WHERE threat_assignment_id = ?1 AND control_id = ?2",
        params![threat_assignment_id, control_id],
    )
    .map_err(sqlite_err)
}

pub fn list_controls_by_assignment(
    conn: &Connection,
    threat_assignment_id: AssignmentId,
) -> Result<Vec<Control>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT c.id, c.title, c.description
               FROM controls c
               JOIN control_assignments ca ON ca.control_id = c.id
              WHERE ca.threat_assignment_id = ?1
              ORDER BY c.title, c.id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![threat_assignment_id], row_to_control)
        .map_err(sqlite_err)?;
    collect_rows(rows)
}
