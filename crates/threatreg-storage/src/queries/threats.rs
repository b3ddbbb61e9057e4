//! threats table queries.

use rusqlite::{params, Connection, Row};
use threatreg_core::errors::StorageError;
use threatreg_core::models::{Threat, ThreatWithUnresolvedCount};
use threatreg_core::types::{DomainId, ThreatId};

use super::{collect_rows, count_to_u64, first_row};
use crate::sqlite_err;

pub(crate) fn row_to_threat(row: &Row) -> rusqlite::Result<Threat> {
    Ok(Threat {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
    })
}

pub fn insert_threat(conn: &Connection, threat: &Threat) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO threats (id, title, description) VALUES (?1, ?2, ?3)",
        params![threat.id, threat.title, threat.description],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_threat(conn: &Connection, id: ThreatId) -> Result<Option<Threat>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, title, description FROM threats WHERE id = ?1")
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![id], row_to_threat).map_err(sqlite_err)?;
    first_row(rows)
}

pub fn threat_exists(conn: &Connection, id: ThreatId) -> Result<bool, StorageError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM threats WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
    .map_err(sqlite_err)
}

pub fn update_threat(conn: &Connection, threat: &Threat) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE threats SET title = ?2, description = ?3 WHERE id = ?1",
        params![threat.id, threat.title, threat.description],
    )
    .map_err(sqlite_err)
}

pub fn delete_threat(conn: &Connection, id: ThreatId) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM threats WHERE id = ?1", params![id])
        .map_err(sqlite_err)
}

pub fn list_threats(conn: &Connection) -> Result<Vec<Threat>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, title, description FROM threats ORDER BY title, id")
        .map_err(sqlite_err)?;
    let rows = stmt.query_map([], row_to_threat).map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Threats assigned to the domain's components, each with the number of those
/// components where it is still unresolved. Rows with a zero count are dropped.
pub fn list_threats_by_domain_with_unresolved_count(
    conn: &Connection,
    domain_id: DomainId,
) -> Result<Vec<ThreatWithUnresolvedCount>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT t.id, t.title, t.description,
                    COUNT(DISTINCT CASE
                        WHEN r.id IS NULL OR r.status NOT IN ('resolved', 'accepted')
                        THEN ta.component_id
                    END) AS unresolved
               FROM threats t
               JOIN threat_assignments ta ON ta.threat_id = t.id
               JOIN domain_components dc
                 ON dc.component_id = ta.component_id AND dc.domain_id = ?1
               LEFT JOIN resolutions r
                 ON r.threat_assignment_id = ta.id AND r.component_id = ta.component_id
              GROUP BY t.id, t.title, t.description
             HAVING unresolved > 0
              ORDER BY t.title, t.id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![domain_id], |row| {
            Ok(ThreatWithUnresolvedCount {
                threat: row_to_threat(row)?,
                unresolved_by_components_count: count_to_u64(row.get(3)?),
            })
        })
        .map_err(sqlite_err)?;
    collect_rows(rows)
}
