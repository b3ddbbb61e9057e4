//! assignment_links queries. Inheritance links point child -> parent.

use rusqlite::{params, Connection, Row};
use threatreg_core::errors::StorageError;
use threatreg_core::models::AssignmentLink;
use threatreg_core::types::AssignmentId;

use super::{collect_rows, first_row};
use crate::sqlite_err;

fn row_to_link(row: &Row) -> rusqlite::Result<AssignmentLink> {
    Ok(AssignmentLink {
        id: row.get(0)?,
        from_id: row.get(1)?,
        to_id: row.get(2)?,
        label: row.get(3)?,
    })
}

pub fn insert_link(conn: &Connection, link: &AssignmentLink) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO assignment_links (id, from_id, to_id, label) VALUES (?1, ?2, ?3, ?4)",
        params![link.id, link.from_id, link.to_id, link.label],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_link(
    conn: &Connection,
    from_id: AssignmentId,
    to_id: AssignmentId,
    label: &str,
) -> Result<Option<AssignmentLink>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, from_id, to_id, label FROM assignment_links
             WHERE from_id = ?1 AND to_id = ?2 AND label = ?3",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![from_id, to_id, label], row_to_link)
        .map_err(sqlite_err)?;
    first_row(rows)
}

pub fn list_links_from(
    conn: &Connection,
    from_id: AssignmentId,
) -> Result<Vec<AssignmentLink>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, from_id, to_id, label FROM assignment_links WHERE from_id = ?1 ORDER BY rowid",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![from_id], row_to_link).map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn list_links_to(
    conn: &Connection,
    to_id: AssignmentId,
) -> Result<Vec<AssignmentLink>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, from_id, to_id, label FROM assignment_links WHERE to_id = ?1 ORDER BY rowid",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![to_id], row_to_link).map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn delete_link(
    conn: &Connection,
    from_id: AssignmentId,
    to_id: AssignmentId,
    label: &str,
) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM assignment_links WHERE from_id = ?1 AND to_id = ?2 AND label = ?3",
        params![from_id, to_id, label],
    )
    .map_err(sqlite_err)
}
